//! Post-invocation actions
//!
//! Actions run one after another in the order the policy listed them. An action that
//! mutates a caller-scoped resource holds that resource's lock while it runs, so two
//! calls from the same caller never interleave their quota updates.

use super::types::PostProcessReport;
use crate::auth::types::PostAction;
use crate::core::audit::{AuditRecord, AuditSink};
use crate::core::models::RequestContext;
use crate::utils::error::{GatewayError, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Per-caller usage against configured allowances
#[derive(Debug, Default)]
pub struct QuotaLedger {
    allowances: HashMap<String, u64>,
    used: DashMap<String, u64>,
}

impl QuotaLedger {
    pub fn new(allowances: HashMap<String, u64>) -> Self {
        Self {
            allowances,
            used: DashMap::new(),
        }
    }

    fn ledger_key(subject: &str, quota: &str) -> String {
        format!("{subject}:{quota}")
    }

    /// Consume `amount` of `quota` for `subject`; returns what is left
    pub fn consume(&self, subject: &str, quota: &str, amount: u64) -> Result<u64> {
        let allowance = *self
            .allowances
            .get(quota)
            .ok_or_else(|| GatewayError::not_found(format!("Unknown quota: {quota}")))?;

        let mut used = self.used.entry(Self::ledger_key(subject, quota)).or_insert(0);
        let next = used.saturating_add(amount);
        if next > allowance {
            return Err(GatewayError::forbidden(format!(
                "Quota {quota} exhausted for {subject}"
            )));
        }
        *used = next;
        Ok(allowance - next)
    }

    /// Allowance left for `subject`, if the quota exists
    pub fn remaining(&self, subject: &str, quota: &str) -> Option<u64> {
        let allowance = *self.allowances.get(quota)?;
        let used = self
            .used
            .get(&Self::ledger_key(subject, quota))
            .map_or(0, |used| *used);
        Some(allowance.saturating_sub(used))
    }
}

/// Runs the post-actions attached to a successful call
pub struct PostActionExecutor {
    audit: Arc<dyn AuditSink>,
    quotas: Arc<QuotaLedger>,
    resource_locks: DashMap<String, Arc<Mutex<()>>>,
    action_timeout: Duration,
}

impl PostActionExecutor {
    pub fn new(audit: Arc<dyn AuditSink>, quotas: Arc<QuotaLedger>, action_timeout: Duration) -> Self {
        Self {
            audit,
            quotas,
            resource_locks: DashMap::new(),
            action_timeout,
        }
    }

    pub fn quotas(&self) -> &Arc<QuotaLedger> {
        &self.quotas
    }

    fn resource_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.resource_locks
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Run every action; failures are logged and counted, never returned
    pub async fn execute(
        &self,
        request: &RequestContext,
        actions: &[PostAction],
        result: &mut serde_json::Value,
    ) -> PostProcessReport {
        let mut report = PostProcessReport::default();

        for action in actions {
            let outcome = tokio::time::timeout(self.action_timeout, async {
                let _guard = match action.resource_key(request.subject()) {
                    Some(key) => Some(self.resource_lock(&key).lock_owned().await),
                    None => None,
                };
                self.apply(request, action, &mut *result)
            })
            .await
            .unwrap_or_else(|_| Err(GatewayError::timeout("post-action timed out")));

            report.executed += 1;
            if let Err(e) = outcome {
                warn!(
                    action = action.kind(),
                    subject = %request.subject(),
                    request_id = %request.request_id,
                    "Post-action failed: {}",
                    e
                );
                report.failed.push(action.kind().to_string());
            }
        }

        report
    }

    fn apply(
        &self,
        request: &RequestContext,
        action: &PostAction,
        result: &mut serde_json::Value,
    ) -> Result<()> {
        match action {
            PostAction::Audit { event } => {
                self.audit.record(AuditRecord::from_request(event, request));
                Ok(())
            }
            PostAction::DecrementQuota { quota, amount } => {
                let left = self.quotas.consume(request.subject(), quota, *amount)?;
                debug!(quota = %quota, subject = %request.subject(), left, "Quota consumed");
                Ok(())
            }
            PostAction::RedactField { field } => {
                if let Some(object) = result.as_object_mut() {
                    object.remove(field);
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for PostActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostActionExecutor")
            .field("action_timeout", &self.action_timeout)
            .finish_non_exhaustive()
    }
}
