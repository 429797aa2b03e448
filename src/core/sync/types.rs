//! Replication types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Another gateway node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Node id, unique in the cluster
    pub id: String,
    /// Base URL of the node's internal API
    pub address: String,
}

impl ClusterMember {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
        }
    }
}

/// How many peer acknowledgements a propagate round waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckPolicy {
    /// The configured quorum, or a majority of peers when none is configured
    #[default]
    Quorum,
    /// Every peer
    All,
}

impl AckPolicy {
    /// Acknowledgements needed out of `peers` remote members
    pub fn required_acks(&self, peers: usize, quorum: Option<usize>) -> usize {
        let required = match self {
            AckPolicy::All => peers,
            AckPolicy::Quorum => quorum.unwrap_or(peers / 2 + 1),
        };
        required.min(peers)
    }
}

/// Identifies one configuration entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigKey {
    pub project: String,
    pub kind: String,
    pub id: String,
}

impl ConfigKey {
    pub fn new(project: impl Into<String>, kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project, self.kind, self.id)
    }
}

/// Write requested by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMutation {
    pub project: String,
    pub kind: String,
    pub id: String,
    pub value: serde_json::Value,
}

impl ConfigMutation {
    pub fn new(
        project: impl Into<String>,
        kind: impl Into<String>,
        id: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            project: project.into(),
            kind: kind.into(),
            id: id.into(),
            value,
        }
    }

    pub fn key(&self) -> ConfigKey {
        ConfigKey::new(&self.project, &self.kind, &self.id)
    }
}

/// Stored configuration entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub project: String,
    pub kind: String,
    pub id: String,
    pub value: serde_json::Value,
    /// Monotonic per key
    pub version: u64,
    /// Node that produced this version
    pub origin: String,
    pub updated_at: DateTime<Utc>,
}

impl ConfigRecord {
    pub fn key(&self) -> ConfigKey {
        ConfigKey::new(&self.project, &self.kind, &self.id)
    }

    /// Last-writer-wins order: higher version first, node id breaks ties
    pub fn supersedes(&self, other: &ConfigRecord) -> bool {
        (self.version, self.origin.as_str()) > (other.version, other.origin.as_str())
    }
}

/// What a local write did to the store
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Created(ConfigRecord),
    Updated(ConfigRecord),
    /// The stored value already equals the mutation's value
    Unchanged(ConfigRecord),
}

impl ApplyOutcome {
    pub fn record(&self) -> &ConfigRecord {
        match self {
            ApplyOutcome::Created(record)
            | ApplyOutcome::Updated(record)
            | ApplyOutcome::Unchanged(record) => record,
        }
    }

    pub fn into_record(self) -> ConfigRecord {
        match self {
            ApplyOutcome::Created(record)
            | ApplyOutcome::Updated(record)
            | ApplyOutcome::Unchanged(record) => record,
        }
    }

    pub fn changed(&self) -> bool {
        !matches!(self, ApplyOutcome::Unchanged(_))
    }
}

/// Whether a propagate round collected the acknowledgements it needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Partial,
}

/// Delivery state of one peer at the end of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MemberState {
    Acknowledged,
    Failed { reason: String },
    /// Still running when the round finished
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberOutcome {
    pub member: String,
    #[serde(flatten)]
    pub state: MemberState,
    pub latency_ms: Option<u64>,
}

/// Result of a propagate round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub status: SyncStatus,
    /// Key that was written
    pub key: ConfigKey,
    /// Version stored locally after the write
    pub version: u64,
    /// Whether the local store changed
    pub changed: bool,
    /// Acknowledgements the round waited for
    pub required_acks: usize,
    /// Peers that acknowledged
    pub acknowledged: Vec<String>,
    /// Peers that did not; empty on success
    pub unacknowledged: Vec<String>,
    /// Per-peer detail, in membership order
    pub members: Vec<MemberOutcome>,
    /// Whether the round ended on its deadline
    pub timed_out: bool,
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        self.status == SyncStatus::Success
    }

    pub fn is_partial(&self) -> bool {
        self.status == SyncStatus::Partial
    }
}

/// Full state pushed between nodes during reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub origin: String,
    pub records: Vec<ConfigRecord>,
}
