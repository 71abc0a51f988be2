//! A single named contract test.
//!
//! A [`Spec`] ties one request to its expectations. Running it never fails:
//! every error on the way (unresolved variable, invalid request, timeout,
//! network failure) becomes a failing [`SpecResult`].

use std::time::{Duration, Instant};

use chrono::Utc;
use covenant_domain::{
    DomainResult, Expectation, Failure, FailureKind, JsonPath, RequestBuilder, RequestSpec,
    ResponseCapture, SpecResult, SuiteConfig,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::assertion::AssertionEngine;
use crate::context::SuiteContext;
use crate::error::ExecuteError;
use crate::ports::Executor;
use crate::suite::Suite;

/// Upper bound for [`RetryPolicy::max_attempts`].
pub const MAX_ATTEMPTS: u32 = 10;

/// How often a spec may re-invoke the executor after a transport failure.
/// Assertion failures are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to `1..=10`.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS),
            delay,
        }
    }

    /// A single attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Total attempts allowed, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Capture {
    variable: String,
    path: String,
}

/// One contract test: a request, its expectations and optional captures.
#[derive(Debug, Clone)]
pub struct Spec {
    name: String,
    request: RequestBuilder,
    expectations: Vec<Expectation>,
    captures: Vec<Capture>,
    retry: RetryPolicy,
}

impl Spec {
    /// Creates a spec with an empty request.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            request: RequestBuilder::new(),
            expectations: Vec::new(),
            captures: Vec::new(),
            retry: RetryPolicy::none(),
        }
    }

    /// Sets the request to issue.
    #[must_use]
    pub fn request(mut self, request: RequestBuilder) -> Self {
        self.request = request;
        self
    }

    /// Adds an expectation; expectations are evaluated in the order added.
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Expects an exact status code.
    #[must_use]
    pub fn expect_status(self, code: u16) -> Self {
        self.expect(Expectation::status(code))
    }

    /// Expects a header to contain a substring.
    #[must_use]
    pub fn expect_header_contains(self, name: &str, substring: &str) -> Self {
        self.expect(Expectation::header_contains(name, substring))
    }

    /// Expects the raw body to contain a substring.
    #[must_use]
    pub fn expect_body_contains(self, substring: &str) -> Self {
        self.expect(Expectation::body_contains(substring))
    }

    /// Expects the body to partially match a JSON shape.
    #[must_use]
    pub fn expect_json_like(self, shape: Value) -> Self {
        self.expect(Expectation::json_like(shape))
    }

    /// Expects the body to validate against a JSON Schema.
    #[must_use]
    pub fn expect_json_schema(self, schema: Value) -> Self {
        self.expect(Expectation::json_schema(schema))
    }

    /// Expects the response to arrive in under `max_ms` milliseconds.
    #[must_use]
    pub fn expect_response_time_under(self, max_ms: u64) -> Self {
        self.expect(Expectation::response_time_under(max_ms))
    }

    /// After a passing run, stores the value at `path` as `variable` in the
    /// suite context.
    #[must_use]
    pub fn capture(mut self, variable: impl Into<String>, path: impl Into<String>) -> Self {
        self.captures.push(Capture {
            variable: variable.into(),
            path: path.into(),
        });
        self
    }

    /// Retries transport failures according to `policy`.
    #[must_use]
    pub const fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Spec name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared expectations.
    #[must_use]
    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    /// Runs the spec inside `suite`. Equivalent to `suite.run(spec)`.
    pub async fn run(self, suite: &mut Suite) -> SpecResult {
        suite.run(self).await
    }

    /// Executes the spec without reporting. Used by [`Suite::run`].
    pub(crate) async fn execute(
        self,
        executor: &dyn Executor,
        config: &SuiteConfig,
        context: &mut SuiteContext,
    ) -> SpecResult {
        let started_at = Utc::now();
        let clock = Instant::now();

        let (result, attempts) = match self.prepare(config, context) {
            Ok(request) => match self.dispatch(executor, &request).await {
                (Ok(response), attempts) => (self.assess(&response, context), attempts),
                (Err(error), attempts) => (
                    SpecResult::failed(&self.name, Failure::error(error.kind(), &error), 0),
                    attempts,
                ),
            },
            Err(error) => (
                SpecResult::failed(&self.name, Failure::error(FailureKind::from(&error), &error), 0),
                0,
            ),
        };

        result
            .with_duration_ms(u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX))
            .with_attempts(attempts)
            .with_started_at(started_at)
    }

    fn prepare(&self, config: &SuiteConfig, context: &SuiteContext) -> DomainResult<RequestSpec> {
        self.request
            .clone()
            .interpolate(|text| context.resolve(text))?
            .with_defaults(config)
            .build()
    }

    async fn dispatch(
        &self,
        executor: &dyn Executor,
        request: &RequestSpec,
    ) -> (Result<ResponseCapture, ExecuteError>, u32) {
        let mut attempt = 1;
        loop {
            debug!(
                spec = %self.name,
                attempt,
                method = %request.method(),
                path = request.path(),
                "executing request"
            );
            match executor.execute(request).await {
                Ok(response) => return (Ok(response), attempt),
                Err(error) if error.is_retryable() && attempt < self.retry.max_attempts() => {
                    warn!(
                        spec = %self.name,
                        attempt,
                        max_attempts = self.retry.max_attempts(),
                        error = %error,
                        "transport failure, retrying"
                    );
                    tokio::time::sleep(self.retry.delay()).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(spec = %self.name, attempt, error = %error, "request failed");
                    return (Err(error), attempt);
                }
            }
        }
    }

    fn assess(&self, response: &ResponseCapture, context: &mut SuiteContext) -> SpecResult {
        let mut result = AssertionEngine::new().evaluate(&self.name, response, &self.expectations);
        if !result.passed() {
            return result;
        }
        for capture in &self.captures {
            match capture_value(response, &capture.path) {
                Ok(value) => context.set(capture.variable.clone(), value),
                Err(reason) => {
                    result = result.with_failure(Failure::error(
                        FailureKind::AssertionFailure,
                        format!("capture '{}': {reason}", capture.variable),
                    ));
                }
            }
        }
        result
    }
}

fn capture_value(response: &ResponseCapture, path: &str) -> Result<Value, String> {
    let path = JsonPath::parse(path).map_err(|e| e.to_string())?;
    let body = response.json().map_err(|e| e.to_string())?;
    path.query(body)
        .cloned()
        .ok_or_else(|| format!("no value at {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn retry_attempts_are_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
        assert_eq!(RetryPolicy::new(3, Duration::ZERO).max_attempts(), 3);
        assert_eq!(RetryPolicy::new(50, Duration::ZERO).max_attempts(), MAX_ATTEMPTS);
    }

    #[test]
    fn expectations_keep_declaration_order() {
        let spec = Spec::new("ping")
            .expect_status(200)
            .expect_header_contains("content-type", "json")
            .expect_response_time_under(5000);
        assert_eq!(
            spec.expectations(),
            &[
                Expectation::status(200),
                Expectation::header_contains("content-type", "json"),
                Expectation::response_time_under(5000),
            ]
        );
    }
}
