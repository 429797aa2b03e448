//! Function dispatch against a mocked downstream service

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{self, PROJECT};
    use crate::{assert_err, assert_ok};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tenantgate::GatewayError;
    use tenantgate::auth::Authorizer;
    use tenantgate::core::audit::{AuditRecord, AuditSink};
    use tenantgate::core::context::ExecutionContext;
    use tenantgate::core::functions::invoker::DEADLINE_HEADER;
    use tenantgate::core::functions::{
        FunctionDispatcher, FunctionInvocation, FunctionsRequest, HttpFunctionInvoker,
        PostActionExecutor, QuotaLedger, TimeoutPolicy,
    };
    use tenantgate::core::models::RequestParts;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct CollectingAuditSink {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl AuditSink for CollectingAuditSink {
        fn record(&self, record: AuditRecord) {
            self.records.lock().push(record);
        }
    }

    struct Harness {
        dispatcher: FunctionDispatcher,
        audit: Arc<CollectingAuditSink>,
        quotas: Arc<QuotaLedger>,
    }

    fn harness(server: &MockServer) -> Harness {
        let config = fixtures::gateway_config();
        let functions = config.functions();

        let audit = Arc::new(CollectingAuditSink::default());
        let quotas = Arc::new(QuotaLedger::new(functions.quotas.clone()));
        let invoker = HttpFunctionInvoker::new(HashMap::from([
            ("billing".to_string(), server.uri()),
            ("reports".to_string(), server.uri()),
        ]))
        .unwrap();

        let dispatcher = FunctionDispatcher::new(
            Arc::new(Authorizer::from_config(config.auth())),
            Arc::new(invoker),
            Arc::new(PostActionExecutor::new(
                audit.clone(),
                quotas.clone(),
                functions.post_action_timeout(),
            )),
            TimeoutPolicy::from_config(functions),
        );

        Harness {
            dispatcher,
            audit,
            quotas,
        }
    }

    fn invocation(service: &str, function: &str, timeout: Option<u64>) -> FunctionInvocation {
        FunctionInvocation::new(
            PROJECT,
            service,
            function,
            FunctionsRequest {
                params: json!({"amount": 42}),
                timeout,
            },
        )
    }

    fn parent() -> ExecutionContext {
        ExecutionContext::with_timeout(Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_dispatch_forwards_params_and_runs_post_actions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/charge"))
            .and(body_json(json!({"amount": 42})))
            .and(header_exists(DEADLINE_HEADER))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"charged": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        let token = fixtures::token("alice", &["admin"]);
        let outcome = assert_ok!(
            h.dispatcher
                .dispatch(
                    &parent(),
                    invocation("billing", "charge", None),
                    &token,
                    RequestParts::new("POST", "/v1/api/acme/services/billing/charge"),
                )
                .await
        );

        assert_eq!(outcome.status, 201);
        assert_eq!(outcome.result, json!({"charged": 42}));
        assert_eq!(outcome.post_process.executed, 2);
        assert!(outcome.post_process.failed.is_empty());
        assert_eq!(outcome.timeout_ms, 10_000);

        let records = h.audit.records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, "billing-call");
        assert_eq!(records[0].subject, "alice");
        assert_eq!(h.quotas.remaining("alice", "calls"), Some(1));
    }

    #[tokio::test]
    async fn test_exhausted_quota_does_not_fail_the_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/charge"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(3)
            .mount(&server)
            .await;

        let h = harness(&server);
        let token = fixtures::token("alice", &["admin"]);

        let mut reports = Vec::new();
        for _ in 0..3 {
            let outcome = assert_ok!(
                h.dispatcher
                    .dispatch(
                        &parent(),
                        invocation("billing", "charge", Some(5)),
                        &token,
                        RequestParts::default(),
                    )
                    .await
            );
            assert_eq!(outcome.result, json!({"ok": true}));
            reports.push(outcome.post_process);
        }

        assert!(reports[0].failed.is_empty());
        assert!(reports[1].failed.is_empty());
        assert_eq!(reports[2].failed, vec!["decrement_quota".to_string()]);
        assert_eq!(h.quotas.remaining("alice", "calls"), Some(0));
        // The audit action before the quota still ran on every call.
        assert_eq!(h.audit.records.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_deadline_before_answer_skips_post_actions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/charge"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"late": true}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let h = harness(&server);
        let token = fixtures::token("alice", &["admin"]);

        assert_err!(
            h.dispatcher
                .dispatch(
                    &parent(),
                    invocation("billing", "charge", Some(1)),
                    &token,
                    RequestParts::default(),
                )
                .await,
            GatewayError::DeadlineExceeded(_)
        );
        assert!(h.audit.records.lock().is_empty());
        assert_eq!(h.quotas.remaining("alice", "calls"), Some(2));
    }

    #[tokio::test]
    async fn test_denied_call_never_reaches_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let h = harness(&server);
        let token = fixtures::token("alice", &["admin"]);

        assert_err!(
            h.dispatcher
                .dispatch(
                    &parent(),
                    invocation("reports", "export", None),
                    &token,
                    RequestParts::default(),
                )
                .await,
            GatewayError::Forbidden(_)
        );
        assert_err!(
            h.dispatcher
                .dispatch(
                    &parent(),
                    invocation("billing", "charge", None),
                    "",
                    RequestParts::default(),
                )
                .await,
            GatewayError::Unauthorized(_)
        );
        assert!(h.audit.records.lock().is_empty());
    }

    #[tokio::test]
    async fn test_function_error_status_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/charge"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"error": "card declined"})))
            .mount(&server)
            .await;

        let h = harness(&server);
        let token = fixtures::token("alice", &["admin"]);

        match h
            .dispatcher
            .dispatch(
                &parent(),
                invocation("billing", "charge", None),
                &token,
                RequestParts::default(),
            )
            .await
        {
            Err(GatewayError::Service { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "card declined");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(h.audit.records.lock().is_empty());
    }

    #[test]
    fn test_timeout_resolution() {
        let policy = TimeoutPolicy::from_config(fixtures::gateway_config().functions());

        assert_eq!(policy.effective(None), Duration::from_secs(10));
        assert_eq!(policy.effective(Some(0)), Duration::from_secs(10));
        assert_eq!(policy.effective(Some(5)), Duration::from_secs(5));
        assert_eq!(policy.effective(Some(30)), Duration::from_secs(15));
    }
}
