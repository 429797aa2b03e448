//! Error handling for the gateway core
//!
//! This module defines the error type shared by every component, its constructor
//! helpers and the mapping to HTTP responses.

mod helpers;
mod response;
mod types;

pub use response::ErrorResponse;
pub use types::{GatewayError, Result};
