//! Main gateway configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Authentication and policy configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Cluster synchronization configuration
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Function dispatch configuration
    #[serde(default)]
    pub functions: FunctionsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}
