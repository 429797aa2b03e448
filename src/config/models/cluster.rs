//! Cluster synchronization configuration

use super::*;
use crate::core::sync::types::{AckPolicy, ClusterMember};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cluster synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Identity of this node; used as the `origin` of records it writes
    #[serde(default = "default_node_id")]
    pub node_id: String,
    /// Peers known at boot; membership can change at runtime
    #[serde(default)]
    pub members: Vec<ClusterMember>,
    /// How many acknowledgements a propagation round waits for
    #[serde(default)]
    pub ack_policy: AckPolicy,
    /// Explicit quorum size; majority of peers when unset
    #[serde(default)]
    pub quorum: Option<usize>,
    /// Upper bound for one propagation round, in seconds
    #[serde(default = "default_propagation_timeout")]
    pub propagation_timeout_secs: u64,
    /// Interval between full-state pushes to every peer; 0 disables
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
    /// Shared secret peers present on replication endpoints
    #[serde(default)]
    pub cluster_token: String,
    /// Largest accepted serialized configuration value
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,
}

fn default_node_id() -> String {
    "node-1".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            members: Vec::new(),
            ack_policy: AckPolicy::default(),
            quorum: None,
            propagation_timeout_secs: default_propagation_timeout(),
            reconcile_interval_secs: default_reconcile_interval(),
            cluster_token: String::new(),
            max_value_bytes: default_max_value_bytes(),
        }
    }
}

impl ClusterConfig {
    /// Propagation timeout as a duration
    pub fn propagation_timeout(&self) -> Duration {
        Duration::from_secs(self.propagation_timeout_secs)
    }

    /// Reconcile interval, `None` when anti-entropy is disabled
    pub fn reconcile_interval(&self) -> Option<Duration> {
        (self.reconcile_interval_secs > 0).then(|| Duration::from_secs(self.reconcile_interval_secs))
    }
}
