//! Mapping outcomes to wire replies
//!
//! Successful replies carry `{"result": ...}`, failures `{"error": message}`. The status
//! for an error comes from [`GatewayError::classify`]; internal detail never reaches the
//! body.

use super::functions::DispatchOutcome;
use super::sync::{ConfigRecord, SyncResult};
use crate::utils::error::{GatewayError, Result};
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

/// Status and JSON body to send back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    /// `200` with `{"result": result}`
    pub fn ok<T: Serialize>(result: T) -> Self {
        Self::with_status(200, result)
    }

    pub fn with_status<T: Serialize>(status: u16, result: T) -> Self {
        match serde_json::to_value(result) {
            Ok(result) => Self {
                status,
                body: json!({ "result": result }),
            },
            Err(e) => Self::from_error(&GatewayError::from(e)),
        }
    }

    pub fn from_error(error: &GatewayError) -> Self {
        let (status, _) = error.classify();
        if status.is_server_error() && !matches!(error, GatewayError::Service { .. }) {
            error!("Request failed: {}", error);
        }
        Self {
            status: status.as_u16(),
            body: json!({ "error": error.public_message() }),
        }
    }

    pub fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::from_error(&e),
        }
    }

    /// Propagation outcome; a partial round is still a `200`
    pub fn from_sync(result: &SyncResult) -> Self {
        Self::ok(result)
    }

    /// Query outcome: a single record for a specific id, a list for a wildcard
    pub fn from_records(records: Vec<ConfigRecord>, wildcard: bool) -> Self {
        let mut values: Vec<Value> = records.into_iter().map(|record| record.value).collect();
        if wildcard {
            Self::ok(values)
        } else {
            Self::ok(values.pop().unwrap_or(Value::Null))
        }
    }

    /// Function result with the status the function answered with
    pub fn from_dispatch(outcome: DispatchOutcome) -> Self {
        Self::with_status(outcome.status, outcome.result)
    }

    pub fn into_response(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(self.body)
    }
}
