//! Core gateway logic
//!
//! Request handling is a fixed pipeline: authorize the caller, execute the operation
//! (configuration sync or function dispatch), then report the outcome.

pub mod audit;
pub mod context;
pub mod functions;
pub mod models;
pub mod reporter;
pub mod sync;
