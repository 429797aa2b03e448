//! Request authorization

use super::jwt::JwtHandler;
use super::policy::{IdentityResolver, PolicyEvaluator, StaticPolicyStore};
use super::resolver::{CachedIdentityResolver, JwtIdentityResolver};
use super::types::{Action, Decision, PostAction, ResourceType, Scope};
use crate::config::AuthConfig;
use crate::core::context::ExecutionContext;
use crate::core::models::RequestContext;
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Verifies a credential and checks it against policy for one request
#[derive(Clone)]
pub struct Authorizer {
    resolver: Arc<dyn IdentityResolver>,
    policy: Arc<dyn PolicyEvaluator>,
}

impl Authorizer {
    pub fn new(resolver: Arc<dyn IdentityResolver>, policy: Arc<dyn PolicyEvaluator>) -> Self {
        Self { resolver, policy }
    }

    /// JWT credentials behind a cache, rules from the configuration file
    pub fn from_config(config: &AuthConfig) -> Self {
        let jwt = JwtIdentityResolver::new(JwtHandler::new(config));
        let resolver = CachedIdentityResolver::from_config(Arc::new(jwt), config);
        let policy = StaticPolicyStore::from_config(config);
        Self::new(Arc::new(resolver), Arc::new(policy))
    }

    /// Resolve the credential and evaluate policy.
    ///
    /// On success returns the request context bound to the caller along with the
    /// post-actions the granting rules attached. A bad credential is `Unauthorized`,
    /// a policy denial is `Forbidden`.
    pub async fn authorize(
        &self,
        credential: &str,
        resource: ResourceType,
        action: Action,
        scope: Scope,
    ) -> Result<(RequestContext, Vec<PostAction>)> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(GatewayError::unauthorized("Missing bearer credential"));
        }

        let identity = self.resolver.resolve_identity(credential).await?;

        let decision = self
            .policy
            .evaluate(&identity, resource, action, &scope)
            .await?;

        match decision {
            Decision::Allow { post_actions } => {
                debug!(
                    subject = %identity.subject,
                    %resource,
                    %action,
                    post_actions = post_actions.len(),
                    "Request authorized"
                );
                let context = RequestContext::new(identity, resource, action, scope);
                Ok((context, post_actions))
            }
            Decision::Deny { reason } => {
                warn!(
                    subject = %identity.subject,
                    %resource,
                    %action,
                    ?scope,
                    "Request denied: {}",
                    reason
                );
                Err(GatewayError::forbidden(format!(
                    "Not allowed to {action} {resource}"
                )))
            }
        }
    }

    /// `authorize` bounded by the caller's deadline and cancellation
    pub async fn authorize_within(
        &self,
        ctx: &ExecutionContext,
        credential: &str,
        resource: ResourceType,
        action: Action,
        scope: Scope,
    ) -> Result<(RequestContext, Vec<PostAction>)> {
        ctx.run(
            "authorization",
            self.authorize(credential, resource, action, scope),
        )
        .await
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer").finish_non_exhaustive()
    }
}
