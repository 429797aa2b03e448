//! In-process clusters served over real HTTP

use super::fixtures;
use std::net::TcpListener;
use tenantgate::core::sync::{AckPolicy, ClusterMember};
use tenantgate::server::server::HttpServer;
use tenantgate::server::state::AppState;

/// One running node
pub struct TestNode {
    pub id: String,
    /// Base URL, e.g. `http://127.0.0.1:41234`
    pub address: String,
    pub state: AppState,
}

impl TestNode {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Nodes that all list each other as members
pub struct TestCluster {
    pub nodes: Vec<TestNode>,
    /// Members that are configured but refuse connections
    pub unreachable: Vec<String>,
}

impl TestCluster {
    /// Start `live` nodes plus `unreachable` members nobody listens on.
    ///
    /// Must be called from within an actix system (`#[actix_web::test]`).
    pub fn start(live: usize, unreachable: usize, ack_policy: AckPolicy, quorum: Option<usize>) -> Self {
        let listeners: Vec<TcpListener> = (0..live)
            .map(|_| TcpListener::bind("127.0.0.1:0").expect("bind"))
            .collect();

        let mut members: Vec<ClusterMember> = listeners
            .iter()
            .enumerate()
            .map(|(i, listener)| {
                let addr = listener.local_addr().expect("local addr");
                ClusterMember::new(format!("node-{}", i + 1), format!("http://{addr}"))
            })
            .collect();

        let mut down = Vec::new();
        for i in 0..unreachable {
            // Bound then released: connections are refused.
            let port = TcpListener::bind("127.0.0.1:0")
                .and_then(|l| l.local_addr())
                .expect("free port")
                .port();
            let id = format!("down-{}", i + 1);
            members.push(ClusterMember::new(&id, format!("http://127.0.0.1:{port}")));
            down.push(id);
        }

        let nodes = listeners
            .into_iter()
            .enumerate()
            .map(|(i, listener)| {
                let member = &members[i];
                let mut config = fixtures::gateway_config();
                config.gateway.cluster.node_id = member.id.clone();
                config.gateway.cluster.members = members.clone();
                config.gateway.cluster.ack_policy = ack_policy;
                config.gateway.cluster.quorum = quorum;

                let state = AppState::from_config(config).expect("state");
                let server = HttpServer::with_state(state.clone());
                actix_web::rt::spawn(async move {
                    let _ = server.start_on(listener).await;
                });

                TestNode {
                    id: member.id.clone(),
                    address: member.address.clone(),
                    state,
                }
            })
            .collect();

        Self {
            nodes,
            unreachable: down,
        }
    }

    pub fn node(&self, index: usize) -> &TestNode {
        &self.nodes[index]
    }
}
