//! Core data models shared across the gateway

use crate::auth::types::{Action, Identity, ResourceType, Scope};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::utils::generate_request_id;

/// Raw request details captured at the HTTP boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestParts {
    /// HTTP method
    pub method: Option<String>,
    /// Request path
    pub path: Option<String>,
    /// Request headers, credentials excluded
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Decoded request body
    pub payload: Option<serde_json::Value>,
}

impl RequestParts {
    pub fn new<M: Into<String>, P: Into<String>>(method: M, path: P) -> Self {
        Self {
            method: Some(method.into()),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Add header
    pub fn add_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set payload
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Authorized request, bound to the caller's identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Request ID
    pub request_id: String,
    /// Resolved caller
    pub identity: Identity,
    /// Resource type the request targets
    pub resource: ResourceType,
    /// Requested action
    pub action: Action,
    /// Attributes that were checked against policy
    pub scope: Scope,
    /// Request timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Captured request details
    #[serde(default)]
    pub request: RequestParts,
    /// Trace ID for distributed tracing
    pub trace_id: Option<String>,
}

impl RequestContext {
    /// Create new request context
    pub fn new(identity: Identity, resource: ResourceType, action: Action, scope: Scope) -> Self {
        Self {
            request_id: generate_request_id(),
            identity,
            resource,
            action,
            scope,
            timestamp: chrono::Utc::now(),
            request: RequestParts::default(),
            trace_id: None,
        }
    }

    /// Attach captured request details
    pub fn with_request(mut self, request: RequestParts) -> Self {
        self.request = request;
        self
    }

    /// Set tracing information
    pub fn with_trace_id<S: Into<String>>(mut self, trace_id: S) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Caller's subject
    pub fn subject(&self) -> &str {
        &self.identity.subject
    }

    /// Value of a scope attribute
    pub fn scope_value(&self, attribute: &str) -> Option<&str> {
        self.scope.get(attribute).map(String::as_str)
    }
}
