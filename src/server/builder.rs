//! Server builder and run_server function

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the HTTP server
    pub fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::Config("Configuration is required".to_string()))?;

        HttpServer::new(&config)
    }
}

/// Load `config_path`, or defaults plus environment when the file does not exist.
///
/// Returns whether the file was found so the caller can report it once logging is up.
pub async fn load_config(config_path: &Path) -> Result<(Config, bool)> {
    if config_path.exists() {
        Ok((Config::from_file(config_path).await?, true))
    } else {
        Ok((Config::from_env()?, false))
    }
}

/// Build a server from `config` and serve until shutdown
pub async fn run_server(config: Config) -> Result<()> {
    let server = ServerBuilder::new().with_config(config).build()?;
    info!(
        node_id = %server.state().config.cluster().node_id,
        peers = server.state().synchronizer.membership().len(),
        "Serving on http://{}",
        server.config().address()
    );
    server.start().await
}
