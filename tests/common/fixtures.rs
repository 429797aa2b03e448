//! Test fixtures and data factories
//!
//! Every factory builds real objects with the same secret and cluster token, so tokens
//! minted here are accepted by any node built from [`gateway_config`].

use serde_json::json;
use std::time::Duration;
use tenantgate::auth::jwt::JwtHandler;
use tenantgate::auth::types::{
    Action, AuthorizationRule, Identity, PostAction, ResourceType, scope_of,
};
use tenantgate::config::{AuthConfig, Config, RolePolicy, SubjectPolicy};
use tenantgate::core::models::RequestContext;

pub const JWT_SECRET: &str = "integration_secret_0123456789abcdefghijkl";
pub const CLUSTER_TOKEN: &str = "integration-cluster-token";

/// Project every fixture role works in
pub const PROJECT: &str = "acme";

/// Role policies shared by every test node
pub fn roles() -> Vec<RolePolicy> {
    vec![
        RolePolicy {
            name: "admin".into(),
            rules: vec![
                AuthorizationRule::allow(
                    ResourceType::AuthProvider,
                    Action::Modify,
                    scope_of([("project", PROJECT)]),
                ),
                AuthorizationRule::allow(
                    ResourceType::AuthProvider,
                    Action::Read,
                    scope_of([("project", PROJECT)]),
                ),
                AuthorizationRule::allow(
                    ResourceType::Function,
                    Action::Invoke,
                    scope_of([("project", PROJECT), ("service", "billing")]),
                )
                .with_post_action(PostAction::Audit {
                    event: "billing-call".into(),
                })
                .with_post_action(PostAction::DecrementQuota {
                    quota: "calls".into(),
                    amount: 1,
                }),
            ],
        },
        RolePolicy {
            name: "auditor".into(),
            rules: vec![AuthorizationRule::allow(
                ResourceType::AuthProvider,
                Action::Read,
                scope_of([("project", PROJECT), ("id", "*")]),
            )],
        },
    ]
}

/// Auth settings with the shared secret and roles
pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: JWT_SECRET.to_string(),
        roles: roles(),
        subjects: vec![SubjectPolicy {
            subject: "mallory".into(),
            rules: vec![
                AuthorizationRule::deny(
                    ResourceType::AuthProvider,
                    Action::Modify,
                    scope_of([("project", "*")]),
                )
                .with_priority(10),
            ],
        }],
        ..AuthConfig::default()
    }
}

/// Single-node configuration with fast timeouts and no background reconciliation
pub fn gateway_config() -> Config {
    let mut config = Config::default();
    config.gateway.server.host = "127.0.0.1".into();
    config.gateway.server.workers = Some(1);
    config.gateway.server.shutdown_timeout_secs = 1;
    config.gateway.auth = auth_config();
    config.gateway.cluster.cluster_token = CLUSTER_TOKEN.to_string();
    config.gateway.cluster.propagation_timeout_secs = 2;
    config.gateway.cluster.reconcile_interval_secs = 0;
    config.gateway.functions.max_timeout_secs = 15;
    config.gateway.functions.quotas.insert("calls".into(), 2);
    config
}

/// Mint a bearer token for `subject` holding `roles`
pub fn token(subject: &str, roles: &[&str]) -> String {
    JwtHandler::new(&auth_config())
        .create_token(
            subject,
            roles.iter().map(|r| r.to_string()).collect(),
            Duration::from_secs(600),
        )
        .expect("token")
}

/// Request context of an admin writing a provider
pub fn admin_request(id: &str) -> RequestContext {
    RequestContext::new(
        Identity::new("alice", vec!["admin".into()]),
        ResourceType::AuthProvider,
        Action::Modify,
        scope_of([("project", PROJECT), ("id", id)]),
    )
}

/// A typical provider document
pub fn provider(client_id: &str) -> serde_json::Value {
    json!({
        "client_id": client_id,
        "client_secret": format!("{client_id}-secret"),
        "enabled": true,
    })
}
