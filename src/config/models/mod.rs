//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

pub mod auth;
pub mod cluster;
pub mod functions;
pub mod gateway;
pub mod logging;
pub mod server;

// Re-export all configuration types
pub use auth::*;
pub use cluster::*;
pub use functions::*;
pub use gateway::*;
pub use logging::*;
pub use server::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

/// Default function timeout in seconds when the caller specifies none
pub fn default_function_timeout() -> u64 {
    10
}

/// Default upper bound for caller-requested function timeouts
pub fn default_max_function_timeout() -> u64 {
    60
}

/// Default bound for a single post-action
pub fn default_post_action_timeout_ms() -> u64 {
    2_000
}

/// Default propagation timeout in seconds
pub fn default_propagation_timeout() -> u64 {
    10
}

/// Default anti-entropy interval in seconds
pub fn default_reconcile_interval() -> u64 {
    30
}

/// Default maximum size of a serialized configuration value
pub fn default_max_value_bytes() -> usize {
    64 * 1024
}

/// Default credential cache TTL in seconds
pub fn default_credential_cache_ttl() -> u64 {
    300
}

/// Default credential cache capacity
pub fn default_credential_cache_capacity() -> u64 {
    10_000
}

pub fn default_true() -> bool {
    true
}
