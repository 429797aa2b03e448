//! Periodic anti-entropy
//!
//! Each node pushes its whole store to every peer on a fixed interval. Peers merge it
//! with the same last-writer-wins rule used for live replication, so members that missed
//! a write during a partial round converge on the next pass.

use super::synchronizer::ConfigSynchronizer;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub records: usize,
    pub pushed: Vec<String>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    synchronizer: Arc<ConfigSynchronizer>,
    interval: Duration,
    push_timeout: Duration,
}

impl Reconciler {
    pub fn new(synchronizer: Arc<ConfigSynchronizer>, interval: Duration, push_timeout: Duration) -> Self {
        Self {
            synchronizer,
            interval,
            push_timeout,
        }
    }

    /// Push the local snapshot to every current peer once
    pub async fn reconcile_once(&self) -> ReconcileReport {
        let snapshot = self.synchronizer.snapshot();
        let peers = self.synchronizer.membership().snapshot();
        let transport = self.synchronizer.transport();

        let pushes = peers.iter().map(|member| {
            let snapshot = &snapshot;
            async move {
                let outcome =
                    tokio::time::timeout(self.push_timeout, transport.push_snapshot(member, snapshot))
                        .await
                        .map_err(|_| "timed out".to_string())
                        .and_then(|result| result.map_err(|e| e.to_string()));
                (member.id.clone(), outcome)
            }
        });

        let mut report = ReconcileReport {
            records: snapshot.records.len(),
            ..ReconcileReport::default()
        };
        for (member, outcome) in join_all(pushes).await {
            match outcome {
                Ok(()) => report.pushed.push(member),
                Err(reason) => {
                    warn!(member = %member, "Snapshot push failed: {}", reason);
                    report.failed.push((member, reason));
                }
            }
        }

        debug!(
            records = report.records,
            pushed = report.pushed.len(),
            failed = report.failed.len(),
            "Reconciliation pass finished"
        );
        report
    }

    /// Run passes until `shutdown` is cancelled
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Reconciler started");
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        self.reconcile_once().await;
                    }
                }
            }
            info!("Reconciler stopped");
        })
    }
}
