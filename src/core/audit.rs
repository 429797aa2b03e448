//! Audit trail for post-invocation actions

use crate::auth::types::Scope;
use crate::core::models::RequestContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One audit entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event: String,
    pub request_id: String,
    pub subject: String,
    pub resource: String,
    pub action: String,
    pub scope: Scope,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn from_request(event: &str, request: &RequestContext) -> Self {
        Self {
            event: event.to_string(),
            request_id: request.request_id.clone(),
            subject: request.identity.subject.clone(),
            resource: request.resource.to_string(),
            action: request.action.to_string(),
            scope: request.scope.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Destination for audit records
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// Emits audit records as structured events on the `audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        info!(
            target: "audit",
            event = %record.event,
            request_id = %record.request_id,
            subject = %record.subject,
            resource = %record.resource,
            action = %record.action,
            scope = ?record.scope,
            timestamp = %record.timestamp,
            "audit"
        );
    }
}
