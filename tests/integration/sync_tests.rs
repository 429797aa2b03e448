//! Configuration replication between live nodes

#[cfg(test)]
mod tests {
    use crate::assert_ok;
    use crate::common::TestCluster;
    use crate::common::fixtures::{self, PROJECT};
    use std::time::Duration;
    use tenantgate::core::context::ExecutionContext;
    use tenantgate::core::sync::{
        AckPolicy, ConfigMutation, ConfigRecord, ConfigStore, Reconciler, SyncStatus,
    };

    const KIND: &str = "auth-provider";

    fn ctx() -> ExecutionContext {
        ExecutionContext::with_timeout(Duration::from_secs(5))
    }

    fn mutation(id: &str, client_id: &str) -> ConfigMutation {
        ConfigMutation::new(PROJECT, KIND, id, fixtures::provider(client_id))
    }

    #[actix_web::test]
    async fn test_write_reaches_every_member() {
        let cluster = TestCluster::start(3, 0, AckPolicy::All, None);
        let origin = &cluster.node(0).state.synchronizer;

        let result = assert_ok!(
            origin
                .propagate(&ctx(), mutation("google", "g-1"), &fixtures::admin_request("google"))
                .await
        );
        assert_eq!(result.status, SyncStatus::Success);
        assert_eq!(result.required_acks, 2);
        assert_eq!(result.acknowledged.len(), 2);
        assert!(result.unacknowledged.is_empty());

        for node in &cluster.nodes[1..] {
            let record = node
                .state
                .synchronizer
                .store()
                .get(PROJECT, KIND, "google")
                .expect("replicated");
            assert_eq!(record.value, fixtures::provider("g-1"));
            assert_eq!(record.version, 1);
            assert_eq!(record.origin, "node-1");
        }
    }

    #[actix_web::test]
    async fn test_quorum_of_two_with_one_member_down_succeeds() {
        let cluster = TestCluster::start(3, 1, AckPolicy::Quorum, Some(2));
        let origin = &cluster.node(0).state.synchronizer;

        let result = assert_ok!(
            origin
                .propagate(&ctx(), mutation("google", "g-1"), &fixtures::admin_request("google"))
                .await
        );

        assert_eq!(result.status, SyncStatus::Success);
        assert_eq!(result.required_acks, 2);
        assert!(result.unacknowledged.is_empty());
    }

    #[actix_web::test]
    async fn test_single_ack_below_quorum_is_partial() {
        let cluster = TestCluster::start(2, 2, AckPolicy::Quorum, Some(2));
        let origin = &cluster.node(0).state.synchronizer;

        let result = assert_ok!(
            origin
                .propagate(&ctx(), mutation("google", "g-1"), &fixtures::admin_request("google"))
                .await
        );

        assert_eq!(result.status, SyncStatus::Partial);
        assert_eq!(result.acknowledged, vec!["node-2".to_string()]);
        let mut unacknowledged = result.unacknowledged.clone();
        unacknowledged.sort();
        assert_eq!(unacknowledged, cluster.unreachable);

        // The local write and the reachable peer keep the value.
        assert!(origin.store().get(PROJECT, KIND, "google").is_some());
        assert!(
            cluster
                .node(1)
                .state
                .synchronizer
                .store()
                .get(PROJECT, KIND, "google")
                .is_some()
        );
    }

    #[actix_web::test]
    async fn test_repeated_write_is_idempotent_cluster_wide() {
        let cluster = TestCluster::start(2, 0, AckPolicy::All, None);
        let origin = &cluster.node(0).state.synchronizer;
        let request = fixtures::admin_request("google");

        let first = assert_ok!(
            origin
                .propagate(&ctx(), mutation("google", "g-1"), &request)
                .await
        );
        let second = assert_ok!(
            origin
                .propagate(&ctx(), mutation("google", "g-1"), &request)
                .await
        );

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.version, second.version);
        assert_eq!(second.status, SyncStatus::Success);

        let peer = cluster.node(1).state.synchronizer.store();
        assert_eq!(peer.len(), 1);
        assert_eq!(peer.get(PROJECT, KIND, "google").map(|r| r.version), Some(1));
    }

    #[actix_web::test]
    async fn test_wildcard_on_peer_keeps_write_order() {
        let cluster = TestCluster::start(2, 0, AckPolicy::All, None);
        let origin = &cluster.node(0).state.synchronizer;

        for id in ["okta", "github", "google"] {
            assert_ok!(
                origin
                    .propagate(&ctx(), mutation(id, id), &fixtures::admin_request(id))
                    .await
            );
        }

        let records = assert_ok!(
            cluster
                .node(1)
                .state
                .synchronizer
                .query(&ctx(), PROJECT, KIND, "*", &fixtures::admin_request("*"))
                .await
        );
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["okta", "github", "google"]);
    }

    #[actix_web::test]
    async fn test_reconcile_repairs_missed_write() {
        let cluster = TestCluster::start(3, 0, AckPolicy::All, None);
        let origin = &cluster.node(0).state.synchronizer;

        // Stored on node-1 only, as if every delivery had failed.
        let record = ConfigRecord {
            project: PROJECT.into(),
            kind: KIND.into(),
            id: "github".into(),
            value: fixtures::provider("gh-1"),
            version: 4,
            origin: "node-1".into(),
            updated_at: chrono::Utc::now(),
        };
        assert!(assert_ok!(origin.apply_replicated(record)));
        assert!(
            cluster
                .node(2)
                .state
                .synchronizer
                .store()
                .get(PROJECT, KIND, "github")
                .is_none()
        );

        let report = Reconciler::new(origin.clone(), Duration::from_secs(60), Duration::from_secs(2))
            .reconcile_once()
            .await;
        assert_eq!(report.records, 1);
        assert_eq!(report.pushed.len(), 2);
        assert!(report.failed.is_empty());

        for node in &cluster.nodes[1..] {
            let repaired = node
                .state
                .synchronizer
                .store()
                .get(PROJECT, KIND, "github")
                .expect("repaired");
            assert_eq!(repaired.version, 4);
        }
    }

    #[actix_web::test]
    async fn test_newer_peer_record_is_not_overwritten_by_reconcile() {
        let cluster = TestCluster::start(2, 0, AckPolicy::All, None);
        let origin = &cluster.node(0).state.synchronizer;
        let peer = &cluster.node(1).state.synchronizer;

        assert_ok!(
            origin
                .propagate(&ctx(), mutation("google", "old"), &fixtures::admin_request("google"))
                .await
        );
        assert_ok!(
            peer.propagate(&ctx(), mutation("google", "new"), &fixtures::admin_request("google"))
                .await
        );

        let report = Reconciler::new(origin.clone(), Duration::from_secs(60), Duration::from_secs(2))
            .reconcile_once()
            .await;
        assert!(report.failed.is_empty());

        let kept = peer.store().get(PROJECT, KIND, "google").expect("record");
        assert_eq!(kept.value, fixtures::provider("new"));
        assert_eq!(kept.version, 2);
        assert_eq!(
            origin.store().get(PROJECT, KIND, "google").map(|r| r.version),
            Some(2)
        );
    }
}
