//! Authentication and policy configuration

use super::*;
use crate::auth::types::AuthorizationRule;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to verify HS256 bearer tokens
    #[serde(default = "generate_secure_jwt_secret")]
    pub jwt_secret: String,
    /// Expected token issuer
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// How long a resolved credential stays cached
    #[serde(default = "default_credential_cache_ttl")]
    pub credential_cache_ttl_secs: u64,
    /// Maximum number of cached credentials
    #[serde(default = "default_credential_cache_capacity")]
    pub credential_cache_capacity: u64,
    /// Rules granted through roles
    #[serde(default)]
    pub roles: Vec<RolePolicy>,
    /// Rules bound directly to a token subject
    #[serde(default)]
    pub subjects: Vec<SubjectPolicy>,
}

/// Rules attached to a role name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePolicy {
    /// Role name as carried in the token's `roles` claim
    pub name: String,
    /// Rules granted to holders of the role
    #[serde(default)]
    pub rules: Vec<AuthorizationRule>,
}

/// Rules attached to a single subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectPolicy {
    /// Token subject
    pub subject: String,
    /// Rules granted to the subject
    #[serde(default)]
    pub rules: Vec<AuthorizationRule>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: generate_secure_jwt_secret(),
            issuer: default_issuer(),
            credential_cache_ttl_secs: default_credential_cache_ttl(),
            credential_cache_capacity: default_credential_cache_capacity(),
            roles: Vec::new(),
            subjects: Vec::new(),
        }
    }
}

fn default_issuer() -> String {
    "tenantgate".to_string()
}

/// Generate a random secret for deployments that did not configure one.
///
/// Tokens signed by other nodes will not verify against it.
fn generate_secure_jwt_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

impl AuthConfig {
    /// Total number of configured rules
    pub fn rule_count(&self) -> usize {
        self.roles.iter().map(|r| r.rules.len()).sum::<usize>()
            + self.subjects.iter().map(|s| s.rules.len()).sum::<usize>()
    }
}

/// Warn about configurations that are valid but probably not intended
pub fn warn_insecure_config(config: &AuthConfig) {
    if config.rule_count() == 0 {
        warn!("No authorization rules configured: every request will be denied");
    }
    for role in &config.roles {
        if role.rules.is_empty() {
            warn!(role = %role.name, "Role has no rules");
        }
    }
}
