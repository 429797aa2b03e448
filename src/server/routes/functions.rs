//! Function invocation endpoint

use crate::core::context::ExecutionContext;
use crate::core::functions::{FunctionInvocation, FunctionsRequest};
use crate::core::reporter::Reply;
use crate::server::state::AppState;
use crate::server::utils::{bearer_token, request_parts};
use actix_web::{HttpRequest, HttpResponse, web};

/// Configure function routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/v1/api/{project}/services/{service}/{function}",
        web::post().to(call_function),
    );
}

/// Invoke a user-defined function.
///
/// A missing or unreadable body is treated as an empty request: no params and the
/// default timeout.
pub async fn call_function(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String, String)>,
    body: Option<web::Json<FunctionsRequest>>,
) -> HttpResponse {
    let (project, service, function) = path.into_inner();
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let invocation = FunctionInvocation::new(project, service, function, request);

    let parent = ExecutionContext::with_timeout(state.config.functions().max_timeout());
    let _cancel_on_drop = parent.drop_guard();

    match state
        .dispatcher
        .dispatch(
            &parent,
            invocation,
            bearer_token(&req),
            request_parts(&req, None),
        )
        .await
    {
        Ok(outcome) => Reply::from_dispatch(outcome),
        Err(e) => Reply::from_error(&e),
    }
    .into_response()
}
