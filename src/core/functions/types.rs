//! Function invocation types

use crate::config::FunctionsConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of a function call request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionsRequest {
    /// Arguments passed to the function
    #[serde(default)]
    pub params: serde_json::Value,
    /// Requested timeout in seconds; absent or 0 selects the default
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// One call to a user-defined function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInvocation {
    pub project: String,
    pub service: String,
    pub function: String,
    pub params: serde_json::Value,
    pub timeout: Option<u64>,
}

impl FunctionInvocation {
    pub fn new(
        project: impl Into<String>,
        service: impl Into<String>,
        function: impl Into<String>,
        request: FunctionsRequest,
    ) -> Self {
        Self {
            project: project.into(),
            service: service.into(),
            function: function.into(),
            params: request.params,
            timeout: request.timeout,
        }
    }
}

/// What the downstream function returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: u16,
    pub result: serde_json::Value,
}

/// Summary of the post-actions run for one call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessReport {
    pub executed: usize,
    /// Kinds of the actions that failed or timed out
    pub failed: Vec<String>,
}

/// Completed dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub status: u16,
    pub result: serde_json::Value,
    pub post_process: PostProcessReport,
    pub timeout_ms: u64,
}

/// Bounds on caller-requested timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub default: Duration,
    pub max: Duration,
}

impl TimeoutPolicy {
    pub fn from_config(config: &FunctionsConfig) -> Self {
        Self {
            default: config.default_timeout(),
            max: config.max_timeout(),
        }
    }

    /// `None` or `0` selects the default; anything else is capped at the maximum
    pub fn effective(&self, requested_secs: Option<u64>) -> Duration {
        match requested_secs {
            None | Some(0) => self.default,
            Some(secs) => Duration::from_secs(secs).min(self.max),
        }
    }
}
