//! Configuration loading and validation
//!
//! Covers the shipped example file and the ways a hand-written file can be rejected.

#[cfg(test)]
mod tests {
    use crate::common::fixtures;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;
    use tenantgate::GatewayError;
    use tenantgate::auth::types::{Effect, PostAction};
    use tenantgate::config::{Config, Validate};
    use tenantgate::core::sync::{AckPolicy, ClusterMember};

    fn example_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/gateway.yaml.example")
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // ==================== Shipped Example ====================

    #[tokio::test]
    async fn test_example_config_loads() {
        let config = Config::from_file(example_path()).await.unwrap();

        assert_eq!(config.server().port, 8000);
        assert_eq!(config.auth().roles.len(), 2);
        assert_eq!(config.auth().rule_count(), 5);
        assert_eq!(config.cluster().members.len(), 2);
        assert_eq!(config.cluster().ack_policy, AckPolicy::Quorum);
        assert_eq!(config.cluster().quorum, Some(1));
        assert_eq!(config.functions().quotas.get("calls"), Some(&1000));
    }

    #[tokio::test]
    async fn test_example_rules_parse_effects_and_post_actions() {
        let config = Config::from_file(example_path()).await.unwrap();

        let developer = &config.auth().roles[1];
        assert_eq!(
            developer.rules[1].post_actions,
            vec![
                PostAction::DecrementQuota {
                    quota: "calls".into(),
                    amount: 1
                },
                PostAction::RedactField {
                    field: "internal_notes".into()
                },
            ]
        );

        let contractor = &config.auth().subjects[0];
        assert_eq!(contractor.rules[0].effect, Effect::Deny);
        assert_eq!(contractor.rules[0].priority, 10);
    }

    // ==================== Rejected Files ====================

    #[tokio::test]
    async fn test_malformed_yaml_is_config_error() {
        let file = write_config("server: [unterminated");
        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[tokio::test]
    async fn test_unknown_post_action_is_rejected() {
        let file = write_config(
            r#"
auth:
  jwt_secret: "a-perfectly-long-secret-for-testing-0123"
  roles:
    - name: admin
      rules:
        - resource: function
          action: invoke
          post_actions:
            - type: send_email
"#,
        );
        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[tokio::test]
    async fn test_short_secret_is_rejected_on_load() {
        let file = write_config("auth:\n  jwt_secret: \"short\"\n");
        match Config::from_file(file.path()).await {
            Err(GatewayError::Config(message)) => assert!(message.contains("32 characters")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    // ==================== Section Validation ====================

    #[test]
    fn test_fixture_config_is_valid() {
        assert!(fixtures::gateway_config().validate().is_ok());
    }

    #[test]
    fn test_peers_without_cluster_token_rejected() {
        let mut config = fixtures::gateway_config();
        config.gateway.cluster.cluster_token.clear();
        config.gateway.cluster.members = vec![ClusterMember::new("node-2", "http://10.0.0.2:8000")];

        let err = config.gateway.cluster.validate().unwrap_err();
        assert!(err.contains("cluster token"));
    }

    #[test]
    fn test_quorum_counts_peers_only() {
        let mut config = fixtures::gateway_config();
        config.gateway.cluster.node_id = "node-1".into();
        config.gateway.cluster.members = vec![
            ClusterMember::new("node-1", "http://10.0.0.1:8000"),
            ClusterMember::new("node-2", "http://10.0.0.2:8000"),
            ClusterMember::new("node-3", "http://10.0.0.3:8000"),
        ];

        config.gateway.cluster.quorum = Some(2);
        assert!(config.gateway.cluster.validate().is_ok());

        config.gateway.cluster.quorum = Some(3);
        assert!(config.gateway.cluster.validate().unwrap_err().contains("Quorum"));
    }

    #[test]
    fn test_max_timeout_below_default_rejected() {
        let mut config = fixtures::gateway_config();
        config.gateway.functions.default_timeout_secs = 30;
        config.gateway.functions.max_timeout_secs = 15;

        assert!(config.gateway.functions.validate().is_err());
        assert!(matches!(config.validate(), Err(GatewayError::Config(_))));
    }
}
