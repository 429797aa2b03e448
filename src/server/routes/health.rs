//! Health endpoint

use crate::core::reporter::Reply;
use crate::server::state::AppState;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: Cow<'static, str>,
    node_id: String,
    version: Cow<'static, str>,
    git_hash: Cow<'static, str>,
    peers: usize,
    records: usize,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// Basic health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    debug!("Health check requested");

    let synchronizer = &state.synchronizer;
    let build = crate::build_info();
    Reply::ok(HealthStatus {
        status: Cow::Borrowed("healthy"),
        node_id: synchronizer.node_id().to_string(),
        version: Cow::Borrowed(build.version),
        git_hash: Cow::Borrowed(build.git_hash),
        peers: synchronizer.membership().len(),
        records: synchronizer.store().len(),
        timestamp: chrono::Utc::now(),
    })
    .into_response()
}
