//! Function dispatch configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Function dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionsConfig {
    /// Timeout applied when the caller asks for none (or zero), in seconds
    #[serde(default = "default_function_timeout")]
    pub default_timeout_secs: u64,
    /// Largest timeout a caller may request, in seconds
    #[serde(default = "default_max_function_timeout")]
    pub max_timeout_secs: u64,
    /// Bound for each post-action, in milliseconds
    #[serde(default = "default_post_action_timeout_ms")]
    pub post_action_timeout_ms: u64,
    /// Service name -> base URL of the backing service
    #[serde(default)]
    pub services: HashMap<String, String>,
    /// Quota name -> allowance granted to each caller
    #[serde(default)]
    pub quotas: HashMap<String, u64>,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_function_timeout(),
            max_timeout_secs: default_max_function_timeout(),
            post_action_timeout_ms: default_post_action_timeout_ms(),
            services: HashMap::new(),
            quotas: HashMap::new(),
        }
    }
}

impl FunctionsConfig {
    /// Default timeout as a duration
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    /// Maximum timeout as a duration
    pub fn max_timeout(&self) -> Duration {
        Duration::from_secs(self.max_timeout_secs)
    }

    /// Post-action bound as a duration
    pub fn post_action_timeout(&self) -> Duration {
        Duration::from_millis(self.post_action_timeout_ms)
    }
}
