//! Error types for the gateway core

use thiserror::Error;

/// Result type alias for the gateway core
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway core
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors (cluster transport, function invoker)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The credential could not be resolved to an identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The identity is known but the policy denies the request
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A bounded wait elapsed without producing a complete answer
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The request deadline elapsed before the work finished
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// The caller went away before the work finished
    #[error("Request cancelled: {0}")]
    Cancelled(String),

    /// The backing service answered with a failure status
    #[error("Service error ({status}): {message}")]
    Service {
        /// Status code reported by the service
        status: u16,
        /// Message reported by the service
        message: String,
    },

    /// Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}
