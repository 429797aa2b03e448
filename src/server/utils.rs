//! Request helpers shared by the route handlers

use crate::core::models::RequestParts;
use crate::core::sync::transport::CLUSTER_TOKEN_HEADER;
use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;

/// Bearer credential from the `Authorization` header, empty when absent
pub fn bearer_token(req: &HttpRequest) -> &str {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or("")
}

/// Capture method, path and headers, leaving out credentials
pub fn request_parts(req: &HttpRequest, payload: Option<serde_json::Value>) -> RequestParts {
    let headers = req
        .headers()
        .iter()
        .filter(|(name, _)| *name != AUTHORIZATION && name.as_str() != CLUSTER_TOKEN_HEADER)
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    RequestParts {
        method: Some(req.method().to_string()),
        path: Some(req.path().to_string()),
        headers,
        payload,
    }
}
