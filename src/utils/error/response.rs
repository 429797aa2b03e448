//! HTTP response handling for errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

/// Message returned for every error whose detail must stay on the server
const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl GatewayError {
    /// Stable status code and machine-readable code for this error
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::Unauthorized(_) | GatewayError::Jwt(_) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            GatewayError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            GatewayError::BadRequest(_) | GatewayError::Serialization(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            GatewayError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            GatewayError::DeadlineExceeded(_) => {
                (StatusCode::GATEWAY_TIMEOUT, "DEADLINE_EXCEEDED")
            }
            // 499 is the de-facto "client closed request" code
            GatewayError::Cancelled(_) => (
                StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST),
                "CANCELLED",
            ),
            GatewayError::Service { status, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "SERVICE_ERROR",
            ),
            GatewayError::Config(_)
            | GatewayError::Yaml(_)
            | GatewayError::Io(_)
            | GatewayError::HttpClient(_)
            | GatewayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message safe to show to the caller
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Config(_)
            | GatewayError::Yaml(_)
            | GatewayError::Io(_)
            | GatewayError::HttpClient(_)
            | GatewayError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            GatewayError::Serialization(_) => "Malformed request payload".to_string(),
            GatewayError::Jwt(_) => "Invalid credential".to_string(),
            GatewayError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::from(self))
    }
}

/// Standard error response format: `{"error": message}`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&GatewayError> for ErrorResponse {
    fn from(error: &GatewayError) -> Self {
        Self {
            error: error.public_message(),
        }
    }
}
