//! Node-to-node delivery

use super::types::{ClusterMember, ConfigRecord, ConfigSnapshot};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Path peers accept single replicated records on
pub const MUTATION_PATH: &str = "/v1/internal/sync/mutation";
/// Path peers accept full snapshots on
pub const SNAPSHOT_PATH: &str = "/v1/internal/sync/snapshot";
/// Shared secret header guarding the internal routes
pub const CLUSTER_TOKEN_HEADER: &str = "x-cluster-token";
/// Sending node id
pub const CLUSTER_ORIGIN_HEADER: &str = "x-cluster-origin";

/// Delivers replication traffic to one peer
#[async_trait]
pub trait ClusterTransport: Send + Sync {
    /// Deliver one record; `Ok` means the peer acknowledged it
    async fn send_mutation(&self, member: &ClusterMember, record: &ConfigRecord) -> Result<()>;

    /// Deliver a full snapshot
    async fn push_snapshot(&self, member: &ClusterMember, snapshot: &ConfigSnapshot) -> Result<()>;
}

/// JSON over HTTP to the peers' internal routes
#[derive(Debug, Clone)]
pub struct HttpClusterTransport {
    client: Client,
    token: String,
    origin: String,
}

impl HttpClusterTransport {
    pub fn new(origin: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token: token.into(),
            origin: origin.into(),
        })
    }

    fn endpoint(member: &ClusterMember, path: &str) -> String {
        format!("{}{}", member.address.trim_end_matches('/'), path)
    }

    async fn post<T: serde::Serialize + Sync>(
        &self,
        member: &ClusterMember,
        path: &str,
        body: &T,
    ) -> Result<()> {
        let response = self
            .client
            .post(Self::endpoint(member, path))
            .header(CLUSTER_TOKEN_HEADER, &self.token)
            .header(CLUSTER_ORIGIN_HEADER, &self.origin)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::timeout(format!("Peer {} did not answer in time", member.id))
                } else {
                    GatewayError::service(502, format!("Peer {} unreachable: {}", member.id, e))
                }
            })?;

        if !response.status().is_success() {
            return Err(GatewayError::service(
                502,
                format!("Peer {} returned status: {}", member.id, response.status()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl ClusterTransport for HttpClusterTransport {
    async fn send_mutation(&self, member: &ClusterMember, record: &ConfigRecord) -> Result<()> {
        self.post(member, MUTATION_PATH, record).await
    }

    async fn push_snapshot(&self, member: &ClusterMember, snapshot: &ConfigSnapshot) -> Result<()> {
        self.post(member, SNAPSHOT_PATH, snapshot).await
    }
}
