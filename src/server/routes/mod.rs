//! HTTP route modules

pub mod cluster;
pub mod config;
pub mod functions;
pub mod health;

use crate::utils::error::GatewayError;
use actix_web::web;

/// Register every route on an app
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(config::configure_routes)
        .configure(functions::configure_routes)
        .configure(cluster::configure_routes);
}

/// JSON extractor settings: body size limit and `{"error": ...}` rejections
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| GatewayError::bad_request(err.to_string()).into())
}
