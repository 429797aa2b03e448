//! Cluster configuration synchronization

pub mod membership;
pub mod reconciler;
pub mod store;
pub mod synchronizer;
pub mod transport;
pub mod types;


pub use membership::ClusterMembership;
pub use reconciler::{ReconcileReport, Reconciler};
pub use store::{ConfigStore, MemoryConfigStore};
pub use synchronizer::{ConfigSynchronizer, PROVIDER_KIND, WILDCARD_ID};
pub use transport::{ClusterTransport, HttpClusterTransport};
pub use types::{
    AckPolicy, ApplyOutcome, ClusterMember, ConfigKey, ConfigMutation, ConfigRecord,
    ConfigSnapshot, MemberOutcome, MemberState, SyncResult, SyncStatus,
};
