//! Suite runs.
//!
//! A [`Suite`] owns one run: it announces the start to the reporter, runs
//! specs one at a time, keeps the handoff context and aggregates results
//! into a [`SuiteSummary`] when finished.

use std::sync::Arc;
use std::time::Instant;

use covenant_domain::{SpecResult, SuiteConfig, SuiteSummary};
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::SuiteContext;
use crate::ports::{Executor, ReporterSink};
use crate::spec::Spec;

/// One suite run. Specs run sequentially because [`Suite::run`] borrows
/// the suite mutably.
pub struct Suite {
    name: String,
    run_id: Uuid,
    config: SuiteConfig,
    executor: Arc<dyn Executor>,
    reporter: Arc<dyn ReporterSink>,
    context: SuiteContext,
    results: Vec<SpecResult>,
    started: Instant,
}

impl Suite {
    /// Starts a run and fires the reporter's start hook.
    #[must_use]
    pub fn start(
        name: impl Into<String>,
        config: SuiteConfig,
        executor: Arc<dyn Executor>,
        reporter: Arc<dyn ReporterSink>,
    ) -> Self {
        let name = name.into();
        let run_id = Uuid::now_v7();
        info!(suite = %name, %run_id, base_url = %config.base_url, "suite started");
        reporter.on_suite_start(&name);
        Self {
            name,
            run_id,
            config,
            executor,
            reporter,
            context: SuiteContext::new(),
            results: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Runs one spec, reports its result and records it.
    pub async fn run(&mut self, spec: Spec) -> SpecResult {
        let result = spec
            .execute(self.executor.as_ref(), &self.config, &mut self.context)
            .await;

        if result.passed() {
            info!(
                suite = %self.name,
                spec = result.name(),
                duration_ms = result.duration_ms(),
                "spec passed"
            );
        } else {
            warn!(
                suite = %self.name,
                spec = result.name(),
                failures = result.failures().len(),
                "spec failed"
            );
        }

        self.reporter.on_spec_result(&result);
        self.results.push(result.clone());
        result
    }

    /// Runs specs in order; a failing spec never skips the ones after it.
    pub async fn run_all<I>(&mut self, specs: I) -> usize
    where
        I: IntoIterator<Item = Spec>,
    {
        let mut failed = 0;
        for spec in specs {
            if !self.run(spec).await.passed() {
                failed += 1;
            }
        }
        failed
    }

    /// Suite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of this run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Configuration shared by every spec.
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Handoff variables captured so far.
    #[must_use]
    pub const fn context(&self) -> &SuiteContext {
        &self.context
    }

    /// Mutable access to the handoff variables, e.g. to seed values.
    pub const fn context_mut(&mut self) -> &mut SuiteContext {
        &mut self.context
    }

    /// Results recorded so far, in run order.
    #[must_use]
    pub fn results(&self) -> &[SpecResult] {
        &self.results
    }

    /// Ends the run, fires the reporter's end hook and returns the summary.
    #[must_use]
    pub fn finish(self) -> SuiteSummary {
        let duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let summary = SuiteSummary::new(self.name, self.run_id, self.results, duration_ms);
        info!(
            suite = %summary.suite_name,
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            duration_ms,
            "suite finished"
        );
        self.reporter.on_suite_end();
        summary
    }
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("run_id", &self.run_id)
            .field("config", &self.config)
            .field("results", &self.results.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ExecuteError, ExecuteResult};
    use crate::reporting::{MemoryReporter, ReportEvent};
    use crate::spec::RetryPolicy;
    use async_trait::async_trait;
    use covenant_domain::{
        Expectation, FailureKind, RequestBody, RequestBuilder, RequestSpec, ResponseCapture,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Replies from a queue of canned outcomes; the last one repeats.
    struct CannedExecutor {
        outcomes: Mutex<Vec<ExecuteResult<(u16, &'static str, u64)>>>,
        calls: AtomicU32,
        seen: Mutex<Vec<String>>,
        payloads: Mutex<Vec<serde_json::Value>>,
    }

    impl CannedExecutor {
        fn new(outcomes: Vec<ExecuteResult<(u16, &'static str, u64)>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
                payloads: Mutex::new(Vec::new()),
            })
        }

        fn replying(status: u16, body: &'static str) -> Arc<Self> {
            Self::new(vec![Ok((status, body, 20))])
        }
    }

    #[async_trait]
    impl Executor for CannedExecutor {
        async fn execute(&self, request: &RequestSpec) -> ExecuteResult<ResponseCapture> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.url().unwrap().to_string());
            if let Some(RequestBody::Json { value }) = request.body() {
                self.payloads.lock().unwrap().push(value.clone());
            }
            let outcome = {
                let mut outcomes = self.outcomes.lock().unwrap();
                if outcomes.len() > 1 {
                    outcomes.remove(0)
                } else {
                    outcomes[0].clone()
                }
            };
            outcome.map(|(status, body, elapsed_ms)| {
                ResponseCapture::new(
                    status,
                    vec![("content-type", "application/json; charset=utf-8")],
                    body.as_bytes().to_vec(),
                    Duration::from_millis(elapsed_ms),
                )
            })
        }
    }

    fn suite(executor: Arc<CannedExecutor>) -> (Suite, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        let suite = Suite::start(
            "JokeAPI",
            SuiteConfig::new("https://v2.jokeapi.dev", 1_000),
            executor,
            reporter.clone(),
        );
        (suite, reporter)
    }

    fn ping() -> Spec {
        Spec::new("ping")
            .request(RequestBuilder::new().get("/ping"))
            .expect_status(200)
            .expect_json_like(json!({"error": false, "ping": "Pong!"}))
    }

    #[tokio::test]
    async fn ping_passes_and_is_reported() {
        let executor = CannedExecutor::replying(200, r#"{"error":false,"ping":"Pong!","timestamp":1}"#);
        let (mut suite, reporter) = suite(executor.clone());

        let result = ping().run(&mut suite).await;
        assert!(result.passed());
        assert_eq!(result.attempts(), 1);
        assert_eq!(result.status(), Some(200));

        let summary = suite.finish();
        assert!(summary.all_passed());
        assert_eq!(
            executor.seen.lock().unwrap().as_slice(),
            ["https://v2.jokeapi.dev/ping"]
        );

        let events = reporter.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ReportEvent::SuiteStarted("JokeAPI".to_string()));
        assert_eq!(events[2], ReportEvent::SuiteEnded);
    }

    #[tokio::test]
    async fn timeout_becomes_failing_result() {
        let executor = CannedExecutor::new(vec![Err(ExecuteError::Timeout { timeout_ms: 1_000 })]);
        let (mut suite, reporter) = suite(executor);

        let result = suite.run(ping()).await;
        assert!(!result.passed());
        assert_eq!(result.status(), None);
        assert_eq!(result.failures().len(), 1);
        assert_eq!(result.failures()[0].kind, FailureKind::TimeoutError);
        assert_eq!(
            result.failures()[0].message,
            "TimeoutError: no response within 1000 ms"
        );
        assert_eq!(reporter.results(), vec![result]);
    }

    #[tokio::test]
    async fn failing_spec_does_not_skip_siblings() {
        let executor = CannedExecutor::new(vec![
            Err(ExecuteError::ConnectionFailed("reset".to_string())),
            Ok((200, r#"{"error":false,"ping":"Pong!"}"#, 10)),
        ]);
        let (mut suite, _) = suite(executor);

        let failed = suite.run_all([ping(), ping()]).await;
        assert_eq!(failed, 1);

        let summary = suite.finish();
        assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
        assert_eq!(summary.results[0].failures()[0].kind, FailureKind::NetworkError);
    }

    #[tokio::test]
    async fn retries_transport_failures_only() {
        let executor = CannedExecutor::new(vec![
            Err(ExecuteError::Timeout { timeout_ms: 1_000 }),
            Err(ExecuteError::ConnectionFailed("reset".to_string())),
            Ok((500, r#"{"error":true}"#, 10)),
        ]);
        let (mut suite, _) = suite(executor.clone());

        let result = suite
            .run(ping().retry(RetryPolicy::new(5, Duration::from_millis(1))))
            .await;
        assert_eq!(result.attempts(), 3);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.status(), Some(500));
        assert!(!result.passed());
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_attempts() {
        let executor = CannedExecutor::new(vec![Err(ExecuteError::Timeout { timeout_ms: 1_000 })]);
        let (mut suite, _) = suite(executor.clone());

        let result = suite
            .run(ping().retry(RetryPolicy::new(2, Duration::ZERO)))
            .await;
        assert_eq!(result.attempts(), 2);
        assert_eq!(result.failures()[0].kind, FailureKind::TimeoutError);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_executor() {
        let executor = CannedExecutor::replying(200, "{}");
        let (mut suite, _) = suite(executor.clone());

        let result = suite
            .run(Spec::new("blank path").request(RequestBuilder::new().get("  ")).expect_status(200))
            .await;
        assert!(!result.passed());
        assert_eq!(result.attempts(), 0);
        assert_eq!(result.failures()[0].kind, FailureKind::InvalidRequestError);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn captured_values_hand_off_to_later_specs() {
        let executor = CannedExecutor::replying(
            200,
            r#"{"error":false,"category":"Programming","id":42,"safe":true}"#,
        );
        let (mut suite, _) = suite(executor.clone());

        let first = Spec::new("random joke")
            .request(RequestBuilder::new().get("/joke/Any"))
            .expect_status(200)
            .capture("jokeId", "$.id")
            .capture("category", "$.category");
        assert!(suite.run(first).await.passed());
        assert_eq!(suite.context().get("jokeId"), Some(&json!(42)));

        let second = Spec::new("same joke by id")
            .request(
                RequestBuilder::new()
                    .get("/joke/{{category}}")
                    .query("idRange", "{{jokeId}}"),
            )
            .expect(Expectation::json_like(json!({"id": 42})));
        assert!(suite.run(second).await.passed());

        assert_eq!(
            executor.seen.lock().unwrap()[1],
            "https://v2.jokeapi.dev/joke/Programming?idRange=42"
        );
    }

    #[tokio::test]
    async fn unresolved_variable_fails_the_spec() {
        let executor = CannedExecutor::replying(200, "{}");
        let (mut suite, _) = suite(executor);

        let result = suite
            .run(Spec::new("orphan").request(RequestBuilder::new().get("/joke/Any?idRange={{jokeId}}")))
            .await;
        assert_eq!(
            result.failures()[0].message,
            "InvalidRequestError: invalid request: unresolved variable 'jokeId'"
        );
    }

    #[tokio::test]
    async fn missing_capture_path_is_recorded() {
        let executor = CannedExecutor::replying(200, r#"{"error":false}"#);
        let (mut suite, _) = suite(executor);

        let result = suite
            .run(
                Spec::new("capture")
                    .request(RequestBuilder::new().get("/joke/Any"))
                    .expect_status(200)
                    .capture("jokeId", "$.id"),
            )
            .await;
        assert!(!result.passed());
        assert_eq!(
            result.failures()[0].message,
            "AssertionFailure: capture 'jokeId': no value at .id"
        );
        assert!(!suite.context().contains("jokeId"));
    }

    #[tokio::test]
    async fn submission_regression_is_detected() {
        let executor = CannedExecutor::replying(201, r#"{"error":false,"message":"Dry Run complete!"}"#);
        let (mut suite, _) = suite(executor);

        let result = suite
            .run(
                Spec::new("submit formatVersion 1")
                    .request(
                        RequestBuilder::new()
                            .post("/submit")
                            .query("dry-run", "")
                            .json(json!({"formatVersion": 1, "category": "Misc"})),
                    )
                    .expect_status(400),
            )
            .await;
        assert!(!result.passed());
        assert_eq!(result.failures()[0].message, "expected status 400, got 201");
    }

    #[tokio::test]
    async fn captured_number_stays_a_number_in_json_payloads() {
        let executor = CannedExecutor::new(vec![
            Ok((200, r#"{"error":false,"id":42}"#, 20)),
            Ok((201, r#"{"error":false}"#, 20)),
        ]);
        let (mut suite, _) = suite(executor.clone());

        Spec::new("fetch")
            .request(RequestBuilder::new().get("/joke/Programming"))
            .expect_status(200)
            .capture("jokeId", "$.id")
            .run(&mut suite)
            .await;
        let submit = Spec::new("submit")
            .request(
                RequestBuilder::new()
                    .post("/submit")
                    .json(json!({"id": "{{jokeId}}", "note": "joke {{jokeId}}"})),
            )
            .expect_status(201)
            .run(&mut suite)
            .await;

        assert!(submit.passed(), "{:?}", submit.failures());
        assert_eq!(
            executor.payloads.lock().unwrap().as_slice(),
            [json!({"id": 42, "note": "joke 42"})]
        );
    }
}
