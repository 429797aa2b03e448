//! Internal replication endpoints, called by peer nodes

use crate::core::reporter::Reply;
use crate::core::sync::transport::{CLUSTER_ORIGIN_HEADER, CLUSTER_TOKEN_HEADER, MUTATION_PATH, SNAPSHOT_PATH};
use crate::core::sync::{ConfigRecord, ConfigSnapshot};
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use tracing::{debug, warn};

/// Configure replication routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(MUTATION_PATH, web::post().to(receive_mutation))
        .route(SNAPSHOT_PATH, web::post().to(receive_snapshot));
}

fn verify_peer(state: &AppState, req: &HttpRequest) -> Result<()> {
    let expected = &state.config.cluster().cluster_token;
    let presented = req
        .headers()
        .get(CLUSTER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if expected.is_empty() || presented != expected {
        let origin = req
            .headers()
            .get(CLUSTER_ORIGIN_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown");
        warn!(origin, "Rejected replication request with bad cluster token");
        return Err(GatewayError::unauthorized("Invalid cluster token"));
    }
    Ok(())
}

/// Apply one record sent by a peer
pub async fn receive_mutation(
    state: web::Data<AppState>,
    req: HttpRequest,
    record: web::Json<ConfigRecord>,
) -> HttpResponse {
    let outcome = verify_peer(&state, &req).and_then(|()| {
        let record = record.into_inner();
        debug!(key = %record.key(), origin = %record.origin, "Replicated record received");
        state.synchronizer.apply_replicated(record)
    });

    Reply::from_result(outcome.map(|applied| json!({ "applied": applied }))).into_response()
}

/// Merge a peer's full snapshot
pub async fn receive_snapshot(
    state: web::Data<AppState>,
    req: HttpRequest,
    snapshot: web::Json<ConfigSnapshot>,
) -> HttpResponse {
    let outcome = verify_peer(&state, &req)
        .and_then(|()| state.synchronizer.merge_snapshot(snapshot.into_inner()));

    Reply::from_result(outcome.map(|applied| json!({ "applied": applied }))).into_response()
}
