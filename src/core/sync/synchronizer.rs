//! Configuration propagation
//!
//! A write is applied to the local store first, then fanned out to one snapshot of the
//! cluster membership. The round resolves as soon as its outcome is decided by the ack
//! policy, or at its deadline. Deliveries still running at that point finish in the
//! background, bounded by the same deadline.

use super::membership::ClusterMembership;
use super::store::ConfigStore;
use super::transport::ClusterTransport;
use super::types::{
    AckPolicy, ConfigKey, ConfigMutation, ConfigRecord, ConfigSnapshot, MemberOutcome,
    MemberState, SyncResult, SyncStatus,
};
use crate::config::ClusterConfig;
use crate::core::context::{ExecutionContext, deadline_after};
use crate::core::models::RequestContext;
use crate::utils::error::{GatewayError, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Wildcard id accepted by `query`
pub const WILDCARD_ID: &str = "*";

/// Kind under which authentication provider settings are stored
pub const PROVIDER_KIND: &str = "auth-provider";

type Delivery = (String, std::result::Result<(), String>, Duration);

pub struct ConfigSynchronizer {
    node_id: String,
    store: Arc<dyn ConfigStore>,
    membership: Arc<ClusterMembership>,
    transport: Arc<dyn ClusterTransport>,
    ack_policy: AckPolicy,
    quorum: Option<usize>,
    propagation_timeout: Duration,
    max_value_bytes: usize,
    key_locks: DashMap<ConfigKey, Arc<Mutex<()>>>,
}

impl ConfigSynchronizer {
    pub fn new(
        config: &ClusterConfig,
        store: Arc<dyn ConfigStore>,
        membership: Arc<ClusterMembership>,
        transport: Arc<dyn ClusterTransport>,
    ) -> Self {
        Self {
            node_id: config.node_id.clone(),
            store,
            membership,
            transport,
            ack_policy: config.ack_policy,
            quorum: config.quorum,
            propagation_timeout: config.propagation_timeout(),
            max_value_bytes: config.max_value_bytes,
            key_locks: DashMap::new(),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn membership(&self) -> &Arc<ClusterMembership> {
        &self.membership
    }

    pub fn transport(&self) -> &Arc<dyn ClusterTransport> {
        &self.transport
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    fn validate_mutation(&self, mutation: &ConfigMutation) -> Result<()> {
        validate_identifiers(&mutation.project, &mutation.kind, &mutation.id)?;
        if mutation.id == WILDCARD_ID {
            return Err(GatewayError::bad_request(
                "'*' cannot be used as a resource id",
            ));
        }

        let size = serde_json::to_vec(&mutation.value)?.len();
        if size > self.max_value_bytes {
            return Err(GatewayError::validation(format!(
                "Value is {} bytes, limit is {}",
                size, self.max_value_bytes
            )));
        }
        Ok(())
    }

    fn key_lock(&self, key: &ConfigKey) -> Arc<Mutex<()>> {
        self.key_locks.entry(key.clone()).or_default().clone()
    }

    /// Apply a write locally and replicate it to the current members.
    ///
    /// Failing to reach enough members is reported as a partial result, not an error;
    /// the local write is kept either way.
    pub async fn propagate(
        &self,
        ctx: &ExecutionContext,
        mutation: ConfigMutation,
        request: &RequestContext,
    ) -> Result<SyncResult> {
        self.validate_mutation(&mutation)?;
        let key = mutation.key();

        let lock = self.key_lock(&key);
        let _guard = ctx
            .run("config propagation", async { Ok(lock.lock_owned().await) })
            .await?;

        let outcome = self
            .store
            .apply_local(&mutation, &self.node_id)
            .map_err(|e| {
                error!(key = %key, "Local apply failed: {}", e);
                GatewayError::internal(format!("Failed to store {}: {}", key, e))
            })?;
        let changed = outcome.changed();
        let record = Arc::new(outcome.into_record());

        if changed {
            info!(
                key = %key,
                version = record.version,
                subject = %request.subject(),
                request_id = %request.request_id,
                "Configuration updated"
            );
        } else {
            debug!(key = %key, "Value unchanged, re-broadcasting current record");
        }

        let peers = self.membership.snapshot();
        let required = self.ack_policy.required_acks(peers.len(), self.quorum);
        let round_deadline = ctx.deadline().min(deadline_after(self.propagation_timeout));

        let (tx, mut rx) = mpsc::channel::<Delivery>(peers.len().max(1));
        for member in peers.iter().cloned() {
            let tx = tx.clone();
            let transport = Arc::clone(&self.transport);
            let record = Arc::clone(&record);
            tokio::spawn(async move {
                let started = Instant::now();
                let result = match tokio::time::timeout_at(
                    round_deadline,
                    transport.send_mutation(&member, &record),
                )
                .await
                {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(_) => Err("no acknowledgement before the deadline".to_string()),
                };
                if tx.send((member.id.clone(), result.clone(), started.elapsed())).await.is_err() {
                    // The round already resolved.
                    match result {
                        Ok(()) => debug!(member = %member.id, "Late acknowledgement"),
                        Err(reason) => warn!(member = %member.id, "Late delivery failed: {}", reason),
                    }
                }
            });
        }
        drop(tx);

        let mut settled: HashMap<String, (MemberState, u64)> = HashMap::new();
        let mut acked = 0usize;
        let mut timed_out = false;

        let round_timer = tokio::time::sleep_until(round_deadline);
        tokio::pin!(round_timer);

        while acked < required && acked + (peers.len() - settled.len()) >= required {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    warn!(key = %key, "Propagation cancelled by caller");
                    return Err(GatewayError::cancelled("config propagation cancelled"));
                }
                _ = &mut round_timer => {
                    timed_out = true;
                    break;
                }
                received = rx.recv() => match received {
                    None => break,
                    Some((member, result, latency)) => {
                        let latency_ms = latency.as_millis() as u64;
                        let state = match result {
                            Ok(()) => {
                                acked += 1;
                                MemberState::Acknowledged
                            }
                            Err(reason) => {
                                warn!(member = %member, key = %key, "Replication failed: {}", reason);
                                MemberState::Failed { reason }
                            }
                        };
                        settled.insert(member, (state, latency_ms));
                    }
                }
            }
        }

        let members: Vec<MemberOutcome> = peers
            .iter()
            .map(|member| match settled.remove(&member.id) {
                Some((state, latency_ms)) => MemberOutcome {
                    member: member.id.clone(),
                    state,
                    latency_ms: Some(latency_ms),
                },
                None => MemberOutcome {
                    member: member.id.clone(),
                    state: MemberState::InFlight,
                    latency_ms: None,
                },
            })
            .collect();

        let acknowledged: Vec<String> = members
            .iter()
            .filter(|m| m.state == MemberState::Acknowledged)
            .map(|m| m.member.clone())
            .collect();

        let status = if acked >= required {
            SyncStatus::Success
        } else {
            SyncStatus::Partial
        };

        let unacknowledged: Vec<String> = match status {
            SyncStatus::Success => Vec::new(),
            SyncStatus::Partial => members
                .iter()
                .filter(|m| m.state != MemberState::Acknowledged)
                .map(|m| m.member.clone())
                .collect(),
        };

        match status {
            SyncStatus::Success => info!(
                key = %key,
                acked,
                required,
                peers = peers.len(),
                "Propagation complete"
            ),
            SyncStatus::Partial => warn!(
                key = %key,
                acked,
                required,
                timed_out,
                unacknowledged = ?unacknowledged,
                "Propagation partial"
            ),
        }

        Ok(SyncResult {
            status,
            key,
            version: record.version,
            changed,
            required_acks: required,
            acknowledged,
            unacknowledged,
            members,
            timed_out,
        })
    }

    /// Read from the local store.
    ///
    /// A specific id yields exactly one record or `NotFound`; `*` yields every record of
    /// the kind in insertion order.
    pub async fn query(
        &self,
        ctx: &ExecutionContext,
        project: &str,
        kind: &str,
        id: &str,
        request: &RequestContext,
    ) -> Result<Vec<ConfigRecord>> {
        ctx.check("config query")?;
        validate_identifiers(project, kind, id)?;

        debug!(
            project,
            kind,
            id,
            subject = %request.subject(),
            "Configuration query"
        );

        if id == WILDCARD_ID {
            return Ok(self.store.list(project, kind));
        }

        self.store
            .get(project, kind, id)
            .map(|record| vec![record])
            .ok_or_else(|| {
                GatewayError::not_found(format!("{kind} '{id}' not found in project '{project}'"))
            })
    }

    /// Whether a project has the provider configured and not switched off.
    ///
    /// A stored provider counts as enabled unless its value sets `"enabled": false`.
    pub fn provider_enabled(&self, project: &str, id: &str) -> bool {
        self.store
            .get(project, PROVIDER_KIND, id)
            .is_some_and(|record| is_enabled(&record))
    }

    /// Ids of the enabled providers of a project, in insertion order
    pub fn enabled_providers(&self, project: &str) -> Vec<String> {
        self.store
            .list(project, PROVIDER_KIND)
            .into_iter()
            .filter(is_enabled)
            .map(|record| record.id)
            .collect()
    }

    /// Apply a record received from a peer
    pub fn apply_replicated(&self, record: ConfigRecord) -> Result<bool> {
        let key = record.key();
        let version = record.version;
        let origin = record.origin.clone();
        let applied = self.store.apply_replicated(record)?;
        if applied {
            debug!(key = %key, version, origin = %origin, "Replicated record applied");
        } else {
            debug!(key = %key, version, origin = %origin, "Stale replicated record ignored");
        }
        Ok(applied)
    }

    /// Merge a peer's snapshot; returns how many records replaced local state
    pub fn merge_snapshot(&self, snapshot: ConfigSnapshot) -> Result<usize> {
        let total = snapshot.records.len();
        let mut applied = 0;
        for record in snapshot.records {
            if self.store.apply_replicated(record)? {
                applied += 1;
            }
        }
        if applied > 0 {
            info!(origin = %snapshot.origin, applied, total, "Merged peer snapshot");
        }
        Ok(applied)
    }

    /// Full local state, tagged with this node's id
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            origin: self.node_id.clone(),
            records: self.store.snapshot(),
        }
    }
}

fn is_enabled(record: &ConfigRecord) -> bool {
    record
        .value
        .get("enabled")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(true)
}

fn validate_identifiers(project: &str, kind: &str, id: &str) -> Result<()> {
    for (name, value) in [("project", project), ("kind", kind), ("id", id)] {
        if value.trim().is_empty() {
            return Err(GatewayError::bad_request(format!("{name} must not be empty")));
        }
    }
    Ok(())
}

impl std::fmt::Debug for ConfigSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSynchronizer")
            .field("node_id", &self.node_id)
            .field("ack_policy", &self.ack_policy)
            .field("quorum", &self.quorum)
            .field("propagation_timeout", &self.propagation_timeout)
            .field("peers", &self.membership.len())
            .finish()
    }
}
