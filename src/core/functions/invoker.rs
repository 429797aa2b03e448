//! Downstream function calls

use super::types::InvocationResult;
use crate::config::FunctionsConfig;
use crate::core::context::ExecutionContext;
use crate::core::models::RequestContext;
use crate::utils::error::{GatewayError, Result};
use crate::utils::truncate_string;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Header carrying the caller's remaining budget in milliseconds
pub const DEADLINE_HEADER: &str = "x-request-deadline-ms";
/// Header carrying the gateway request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_ERROR_MESSAGE_CHARS: usize = 200;

/// Executes a function on behalf of an authorized caller
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Run `function` of `service` once. Implementations must not retry.
    async fn call(
        &self,
        ctx: &ExecutionContext,
        service: &str,
        function: &str,
        credential: &str,
        request: &RequestContext,
        params: &serde_json::Value,
    ) -> Result<InvocationResult>;
}

/// Calls functions over HTTP at `{service base URL}/{function}`
#[derive(Debug, Clone)]
pub struct HttpFunctionInvoker {
    client: Client,
    services: HashMap<String, String>,
}

impl HttpFunctionInvoker {
    pub fn new(services: HashMap<String, String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, services })
    }

    pub fn from_config(config: &FunctionsConfig) -> Result<Self> {
        Self::new(config.services.clone())
    }

    fn endpoint(&self, service: &str, function: &str) -> Result<String> {
        let base = self
            .services
            .get(service)
            .ok_or_else(|| GatewayError::not_found(format!("Unknown service: {}", service)))?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), function))
    }
}

fn parse_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

#[async_trait]
impl FunctionInvoker for HttpFunctionInvoker {
    async fn call(
        &self,
        ctx: &ExecutionContext,
        service: &str,
        function: &str,
        credential: &str,
        request: &RequestContext,
        params: &serde_json::Value,
    ) -> Result<InvocationResult> {
        let url = self.endpoint(service, function)?;
        let remaining = ctx.remaining();
        if remaining.is_zero() {
            return Err(GatewayError::deadline_exceeded(
                "No time left to invoke the function",
            ));
        }

        debug!(%url, remaining_ms = remaining.as_millis() as u64, "Invoking function");

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential)
            .header(REQUEST_ID_HEADER, &request.request_id)
            .header(DEADLINE_HEADER, remaining.as_millis().to_string())
            .timeout(remaining)
            .json(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::deadline_exceeded(format!("{service}/{function} did not finish in time"))
                } else {
                    GatewayError::service(502, format!("{service} unreachable: {e}"))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::deadline_exceeded(format!("{service}/{function} did not finish in time"))
            } else {
                GatewayError::service(502, format!("Failed to read {service} response: {e}"))
            }
        })?;
        let body = parse_body(&text);

        if !status.is_success() {
            let message = match &body {
                serde_json::Value::String(text) => truncate_string(text, MAX_ERROR_MESSAGE_CHARS),
                other => other
                    .get("error")
                    .and_then(|e| e.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        format!("{service}/{function} returned status {}", status.as_u16())
                    }),
            };
            return Err(GatewayError::service(status.as_u16(), message));
        }

        Ok(InvocationResult {
            status: status.as_u16(),
            result: body,
        })
    }
}
