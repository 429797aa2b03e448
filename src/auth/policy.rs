//! Policy lookup and rule evaluation

use super::matcher::scope_matches;
use super::types::{Action, AuthorizationRule, Decision, Effect, Identity, ResourceType, Scope};
use crate::config::AuthConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Turns an opaque credential into an identity
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve `credential`, failing with `Unauthorized` when it is not valid
    async fn resolve_identity(&self, credential: &str) -> Result<Identity>;
}

/// Decides whether an identity may perform an action on a scope
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        identity: &Identity,
        resource: ResourceType,
        action: Action,
        scope: &Scope,
    ) -> Result<Decision>;
}

/// Evaluate rules against a request.
///
/// Only rules for the same resource type and action whose matcher covers the scope are
/// considered. Among those, the highest priority level decides: any deny at that level
/// wins, otherwise the allow rules at that level grant access and contribute their
/// post-actions. No applicable rule means deny.
pub fn evaluate_rules<'a, I>(rules: I, resource: ResourceType, action: Action, scope: &Scope) -> Decision
where
    I: IntoIterator<Item = &'a AuthorizationRule>,
{
    let applicable: Vec<&AuthorizationRule> = rules
        .into_iter()
        .filter(|rule| rule.resource == resource && rule.action == action)
        .filter(|rule| scope_matches(&rule.scope, scope))
        .collect();

    let Some(top) = applicable.iter().map(|rule| rule.priority).max() else {
        return Decision::Deny {
            reason: format!("no rule grants {action} on {resource}"),
        };
    };

    let deciding: Vec<&AuthorizationRule> = applicable
        .into_iter()
        .filter(|rule| rule.priority == top)
        .collect();

    if deciding.iter().any(|rule| rule.effect == Effect::Deny) {
        return Decision::Deny {
            reason: format!("{action} on {resource} explicitly denied"),
        };
    }

    Decision::Allow {
        post_actions: deciding
            .into_iter()
            .flat_map(|rule| rule.post_actions.iter().cloned())
            .collect(),
    }
}

/// Rules loaded from the `auth` configuration section
#[derive(Debug, Clone, Default)]
pub struct StaticPolicyStore {
    by_role: HashMap<String, Vec<AuthorizationRule>>,
    by_subject: HashMap<String, Vec<AuthorizationRule>>,
}

impl StaticPolicyStore {
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut store = Self::default();
        for role in &config.roles {
            store
                .by_role
                .entry(role.name.clone())
                .or_default()
                .extend(role.rules.iter().cloned());
        }
        for subject in &config.subjects {
            store
                .by_subject
                .entry(subject.subject.clone())
                .or_default()
                .extend(subject.rules.iter().cloned());
        }
        store
    }

    /// Rules reachable from the identity's subject and roles
    pub fn rules_for<'a>(&'a self, identity: &Identity) -> Vec<&'a AuthorizationRule> {
        let direct = self
            .by_subject
            .get(&identity.subject)
            .into_iter()
            .flatten();
        let granted = identity
            .roles
            .iter()
            .filter_map(|role| self.by_role.get(role))
            .flatten();
        direct.chain(granted).collect()
    }
}

#[async_trait]
impl PolicyEvaluator for StaticPolicyStore {
    async fn evaluate(
        &self,
        identity: &Identity,
        resource: ResourceType,
        action: Action,
        scope: &Scope,
    ) -> Result<Decision> {
        Ok(evaluate_rules(
            self.rules_for(identity),
            resource,
            action,
            scope,
        ))
    }
}
