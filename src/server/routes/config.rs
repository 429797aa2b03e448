//! Project configuration endpoints

use crate::auth::types::{Action, ResourceType, scope_of};
use crate::core::context::ExecutionContext;
use crate::core::reporter::Reply;
use crate::core::sync::{ConfigMutation, PROVIDER_KIND, WILDCARD_ID};
use crate::server::state::AppState;
use crate::server::utils::{bearer_token, request_parts};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

/// Configure configuration routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/config/projects/{project}/user-management/provider")
            .route("", web::get().to(get_providers))
            .route("/{id}", web::post().to(set_provider)),
    );
}

#[derive(Debug, Deserialize)]
pub struct ProviderQuery {
    pub id: Option<String>,
}

/// Store one provider configuration and replicate it
pub async fn set_provider(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let (project, id) = path.into_inner();
    let value = body.into_inner();

    let ctx = ExecutionContext::with_timeout(state.config.cluster().propagation_timeout());
    let _cancel_on_drop = ctx.drop_guard();

    let scope = scope_of([("project", project.as_str()), ("id", id.as_str())]);
    let outcome = async {
        let (request, _) = state
            .authorizer
            .authorize_within(
                &ctx,
                bearer_token(&req),
                ResourceType::AuthProvider,
                Action::Modify,
                scope,
            )
            .await?;
        let request = request.with_request(request_parts(&req, Some(value.clone())));

        state
            .synchronizer
            .propagate(
                &ctx,
                ConfigMutation::new(project, PROVIDER_KIND, id, value),
                &request,
            )
            .await
    }
    .await;

    match outcome {
        Ok(result) => Reply::from_sync(&result),
        Err(e) => Reply::from_error(&e),
    }
    .into_response()
}

/// Read one provider (`?id=`) or all of them
pub async fn get_providers(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<ProviderQuery>,
) -> HttpResponse {
    let project = path.into_inner();
    let id = query
        .into_inner()
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| WILDCARD_ID.to_string());
    let wildcard = id == WILDCARD_ID;

    let ctx = ExecutionContext::with_timeout(state.config.cluster().propagation_timeout());
    let _cancel_on_drop = ctx.drop_guard();

    let scope = scope_of([("project", project.as_str()), ("id", id.as_str())]);
    let outcome = async {
        let (request, _) = state
            .authorizer
            .authorize_within(
                &ctx,
                bearer_token(&req),
                ResourceType::AuthProvider,
                Action::Read,
                scope,
            )
            .await?;
        let request = request.with_request(request_parts(&req, None));

        state
            .synchronizer
            .query(&ctx, &project, PROVIDER_KIND, &id, &request)
            .await
    }
    .await;

    match outcome {
        Ok(records) => Reply::from_records(records, wildcard),
        Err(e) => Reply::from_error(&e),
    }
    .into_response()
}
