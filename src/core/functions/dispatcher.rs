//! Function dispatch pipeline: authorize, invoke, post-process

use super::invoker::FunctionInvoker;
use super::post_actions::PostActionExecutor;
use super::types::{
    DispatchOutcome, FunctionInvocation, InvocationResult, PostProcessReport, TimeoutPolicy,
};
use crate::auth::Authorizer;
use crate::auth::types::{Action, PostAction, ResourceType, scope_of};
use crate::core::context::ExecutionContext;
use crate::core::models::{RequestContext, RequestParts};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct FunctionDispatcher {
    authorizer: Arc<Authorizer>,
    invoker: Arc<dyn FunctionInvoker>,
    post_actions: Arc<PostActionExecutor>,
    timeouts: TimeoutPolicy,
}

impl FunctionDispatcher {
    pub fn new(
        authorizer: Arc<Authorizer>,
        invoker: Arc<dyn FunctionInvoker>,
        post_actions: Arc<PostActionExecutor>,
        timeouts: TimeoutPolicy,
    ) -> Self {
        Self {
            authorizer,
            invoker,
            post_actions,
            timeouts,
        }
    }

    pub fn effective_timeout(&self, requested_secs: Option<u64>) -> Duration {
        self.timeouts.effective(requested_secs)
    }

    /// Check that the caller may invoke `service/function` in `project`
    pub async fn authorize(
        &self,
        ctx: &ExecutionContext,
        project: &str,
        service: &str,
        function: &str,
        credential: &str,
        params: &serde_json::Value,
    ) -> Result<(Vec<PostAction>, RequestContext)> {
        let scope = scope_of([
            ("project", project),
            ("service", service),
            ("function", function),
        ]);
        let (request, actions) = self
            .authorizer
            .authorize_within(ctx, credential, ResourceType::Function, Action::Invoke, scope)
            .await?;

        let request = RequestContext {
            request: RequestParts {
                payload: Some(params.clone()),
                ..request.request
            },
            ..request
        };
        Ok((actions, request))
    }

    /// Call the function once under the context's deadline
    pub async fn invoke(
        &self,
        ctx: &ExecutionContext,
        service: &str,
        function: &str,
        credential: &str,
        request: &RequestContext,
        params: &serde_json::Value,
    ) -> Result<InvocationResult> {
        ctx.run(
            "function invocation",
            self.invoker
                .call(ctx, service, function, credential, request, params),
        )
        .await
    }

    /// Run post-actions against a successful result
    pub async fn post_process(
        &self,
        request: &RequestContext,
        actions: &[PostAction],
        result: &mut serde_json::Value,
    ) -> PostProcessReport {
        if actions.is_empty() {
            return PostProcessReport::default();
        }
        self.post_actions.execute(request, actions, result).await
    }

    /// Authorize, invoke and post-process one call.
    ///
    /// The deadline derived from the requested timeout is set before authorization and
    /// covers every step up to the function's answer. Post-actions run only after a
    /// successful invocation.
    pub async fn dispatch(
        &self,
        parent: &ExecutionContext,
        invocation: FunctionInvocation,
        credential: &str,
        parts: RequestParts,
    ) -> Result<DispatchOutcome> {
        let timeout = self.effective_timeout(invocation.timeout);
        let ctx = parent.child(timeout);

        let (actions, request) = self
            .authorize(
                &ctx,
                &invocation.project,
                &invocation.service,
                &invocation.function,
                credential,
                &invocation.params,
            )
            .await?;
        let request = RequestContext {
            request: RequestParts {
                payload: request.request.payload.clone(),
                ..parts
            },
            ..request
        };

        debug!(
            project = %invocation.project,
            service = %invocation.service,
            function = %invocation.function,
            timeout_ms = timeout.as_millis() as u64,
            request_id = %request.request_id,
            "Dispatching function"
        );

        let invocation_result = match self
            .invoke(
                &ctx,
                &invocation.service,
                &invocation.function,
                credential,
                &request,
                &invocation.params,
            )
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    service = %invocation.service,
                    function = %invocation.function,
                    request_id = %request.request_id,
                    "Invocation failed: {}",
                    e
                );
                return Err(e);
            }
        };

        let mut result = invocation_result.result;
        let post_process = self.post_process(&request, &actions, &mut result).await;

        info!(
            service = %invocation.service,
            function = %invocation.function,
            status = invocation_result.status,
            post_actions = post_process.executed,
            post_action_failures = post_process.failed.len(),
            "Function dispatched"
        );

        Ok(DispatchOutcome {
            status: invocation_result.status,
            result,
            post_process,
            timeout_ms: timeout.as_millis() as u64,
        })
    }
}

impl std::fmt::Debug for FunctionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDispatcher")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}
