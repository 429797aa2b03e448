//! Configuration management for the gateway
//!
//! This module handles loading, validation, and management of all gateway configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the gateway
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?.with_env_overrides()?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse configuration from a YAML document without validating it
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let gateway: GatewayConfig = serde_yaml::from_str(content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(Self { gateway })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self::default().with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TENANTGATE_*` environment overrides (a `.env` file is honored)
    pub fn with_env_overrides(mut self) -> Result<Self> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();

        if let Ok(host) = std::env::var("TENANTGATE_HOST") {
            self.gateway.server.host = host;
        }
        if let Ok(port) = std::env::var("TENANTGATE_PORT") {
            self.gateway.server.port = port
                .parse()
                .map_err(|e| GatewayError::Config(format!("Invalid TENANTGATE_PORT: {}", e)))?;
        }
        if let Ok(secret) = std::env::var("TENANTGATE_JWT_SECRET") {
            self.gateway.auth.jwt_secret = secret;
        }
        if let Ok(node_id) = std::env::var("TENANTGATE_NODE_ID") {
            self.gateway.cluster.node_id = node_id;
        }
        if let Ok(token) = std::env::var("TENANTGATE_CLUSTER_TOKEN") {
            self.gateway.cluster.cluster_token = token;
        }
        if let Ok(level) = std::env::var("TENANTGATE_LOG_LEVEL") {
            self.gateway.logging.level = level;
        }
        Ok(self)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.gateway.server
    }

    /// Get auth configuration
    pub fn auth(&self) -> &AuthConfig {
        &self.gateway.auth
    }

    /// Get cluster configuration
    pub fn cluster(&self) -> &ClusterConfig {
        &self.gateway.cluster
    }

    /// Get function dispatch configuration
    pub fn functions(&self) -> &FunctionsConfig {
        &self.gateway.functions
    }

    /// Get logging configuration
    pub fn logging(&self) -> &LoggingConfig {
        &self.gateway.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.gateway.validate().map_err(GatewayError::Config)?;

        crate::config::models::auth::warn_insecure_config(&self.gateway.auth);

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.gateway)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
