//! Authorization against configured role and subject policies

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{self, PROJECT};
    use crate::{assert_err, assert_ok};
    use std::time::Duration;
    use tenantgate::GatewayError;
    use tenantgate::auth::types::{Action, PostAction, ResourceType, scope_of};
    use tenantgate::auth::Authorizer;
    use tenantgate::core::context::ExecutionContext;

    fn authorizer() -> Authorizer {
        Authorizer::from_config(&fixtures::auth_config())
    }

    #[tokio::test]
    async fn test_admin_may_modify_provider() {
        let token = fixtures::token("alice", &["admin"]);
        let (request, actions) = assert_ok!(
            authorizer()
                .authorize(
                    &token,
                    ResourceType::AuthProvider,
                    Action::Modify,
                    scope_of([("project", PROJECT), ("id", "google")]),
                )
                .await
        );

        assert_eq!(request.subject(), "alice");
        assert_eq!(request.scope_value("id"), Some("google"));
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_or_forged_credential_is_unauthorized() {
        let authorizer = authorizer();
        let scope = scope_of([("project", PROJECT), ("id", "google")]);

        assert_err!(
            authorizer
                .authorize("", ResourceType::AuthProvider, Action::Read, scope.clone())
                .await,
            GatewayError::Unauthorized(_)
        );
        assert_err!(
            authorizer
                .authorize("not-a-jwt", ResourceType::AuthProvider, Action::Read, scope)
                .await,
            GatewayError::Unauthorized(_)
        );
    }

    #[tokio::test]
    async fn test_other_project_is_forbidden() {
        let token = fixtures::token("alice", &["admin"]);
        assert_err!(
            authorizer()
                .authorize(
                    &token,
                    ResourceType::AuthProvider,
                    Action::Modify,
                    scope_of([("project", "globex"), ("id", "google")]),
                )
                .await,
            GatewayError::Forbidden(_)
        );
    }

    #[tokio::test]
    async fn test_higher_priority_subject_deny_overrides_role() {
        let token = fixtures::token("mallory", &["admin"]);
        let authorizer = authorizer();

        assert_err!(
            authorizer
                .authorize(
                    &token,
                    ResourceType::AuthProvider,
                    Action::Modify,
                    scope_of([("project", PROJECT), ("id", "google")]),
                )
                .await,
            GatewayError::Forbidden(_)
        );

        // Reads are untouched by the deny rule.
        assert_ok!(
            authorizer
                .authorize(
                    &token,
                    ResourceType::AuthProvider,
                    Action::Read,
                    scope_of([("project", PROJECT), ("id", "google")]),
                )
                .await
        );
    }

    #[tokio::test]
    async fn test_read_only_role_cannot_write() {
        let token = fixtures::token("carol", &["auditor"]);
        let authorizer = authorizer();

        assert_ok!(
            authorizer
                .authorize(
                    &token,
                    ResourceType::AuthProvider,
                    Action::Read,
                    scope_of([("project", PROJECT), ("id", "*")]),
                )
                .await
        );
        assert_err!(
            authorizer
                .authorize(
                    &token,
                    ResourceType::AuthProvider,
                    Action::Modify,
                    scope_of([("project", PROJECT), ("id", "google")]),
                )
                .await,
            GatewayError::Forbidden(_)
        );
    }

    #[tokio::test]
    async fn test_function_grant_carries_post_actions_in_rule_order() {
        let token = fixtures::token("alice", &["admin"]);
        let (_, actions) = assert_ok!(
            authorizer()
                .authorize(
                    &token,
                    ResourceType::Function,
                    Action::Invoke,
                    scope_of([
                        ("project", PROJECT),
                        ("service", "billing"),
                        ("function", "charge"),
                    ]),
                )
                .await
        );

        assert_eq!(
            actions,
            vec![
                PostAction::Audit {
                    event: "billing-call".into()
                },
                PostAction::DecrementQuota {
                    quota: "calls".into(),
                    amount: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_authorize_within_cancelled_context() {
        let token = fixtures::token("alice", &["admin"]);
        let ctx = ExecutionContext::with_timeout(Duration::from_secs(5));
        ctx.cancel();

        assert_err!(
            authorizer()
                .authorize_within(
                    &ctx,
                    &token,
                    ResourceType::AuthProvider,
                    Action::Read,
                    scope_of([("project", PROJECT), ("id", "google")]),
                )
                .await,
            GatewayError::Cancelled(_)
        );
    }
}
