//! # tenantgate
//!
//! Control-plane core of a multi-tenant API gateway.
//!
//! - **Authorization**: bearer credentials resolve to identities whose rules are
//!   evaluated against the resource type, action and scope of each request.
//! - **Configuration sync**: project configuration is written locally and replicated to
//!   every cluster member under a quorum or all-members acknowledgement policy.
//! - **Function dispatch**: user-defined functions run under a caller-chosen, bounded
//!   deadline, followed by the post-actions the granting policy attached.
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use tenantgate::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config)?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod utils;

pub use config::Config;
pub use utils::error::{GatewayError, Result};

pub use auth::Authorizer;
pub use core::context::ExecutionContext;
pub use core::functions::FunctionDispatcher;
pub use core::models::RequestContext;
pub use core::reporter::Reply;
pub use core::sync::ConfigSynchronizer;

use tracing::{debug, info};

/// A gateway node
pub struct Gateway {
    server: server::server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");
        debug!("Configuration: {:#?}", config.gateway.server);

        let server = server::builder::ServerBuilder::new()
            .with_config(config)
            .build()?;
        Ok(Self { server })
    }

    /// Run the gateway server
    pub async fn run(self) -> Result<()> {
        info!("Starting tenantgate {} ({})", VERSION, build_info().git_hash);
        self.server.start().await
    }
}

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Gateway build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp (seconds since the epoch)
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
}

/// Build
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        build_time: env!("TENANTGATE_BUILD_TIME"),
        git_hash: env!("TENANTGATE_GIT_HASH"),
    }
}
