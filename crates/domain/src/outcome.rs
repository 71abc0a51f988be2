//! Spec and suite results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::expectation::Expectation;

/// Category of a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// An expectation was not met.
    AssertionFailure,
    /// The request could not be built.
    InvalidRequestError,
    /// The connection could not be established or was dropped.
    NetworkError,
    /// No complete response arrived within the timeout.
    TimeoutError,
    /// The body was read as JSON but did not parse.
    MalformedBodyError,
}

impl FailureKind {
    /// Stable name used in messages and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AssertionFailure => "AssertionFailure",
            Self::InvalidRequestError => "InvalidRequestError",
            Self::NetworkError => "NetworkError",
            Self::TimeoutError => "TimeoutError",
            Self::MalformedBodyError => "MalformedBodyError",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violated contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure category.
    pub kind: FailureKind,
    /// The expectation that failed; `None` for failures that happened
    /// before any expectation could run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectation: Option<Expectation>,
    /// Summary message.
    pub message: String,
    /// Individual violations when one expectation found several.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Failure {
    /// An unmet expectation.
    #[must_use]
    pub fn assertion(expectation: &Expectation, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::AssertionFailure,
            expectation: Some(expectation.clone()),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// An unmet expectation with one detail line per violation. The
    /// message joins the details.
    #[must_use]
    pub fn assertion_with_details(expectation: &Expectation, details: Vec<String>) -> Self {
        Self {
            kind: FailureKind::AssertionFailure,
            expectation: Some(expectation.clone()),
            message: details.join("; "),
            details,
        }
    }

    /// An expectation that needed a JSON body the response did not have.
    #[must_use]
    pub fn malformed_body(expectation: &Expectation, reason: &str) -> Self {
        Self {
            kind: FailureKind::MalformedBodyError,
            expectation: Some(expectation.clone()),
            message: format!("{}: body is not valid JSON ({reason})", FailureKind::MalformedBodyError),
            details: Vec::new(),
        }
    }

    /// A failure that prevented any expectation from running. The message
    /// is prefixed with the kind name, e.g. `TimeoutError: ...`.
    #[must_use]
    pub fn error(kind: FailureKind, message: impl fmt::Display) -> Self {
        Self {
            kind,
            expectation: None,
            message: format!("{kind}: {message}"),
            details: Vec::new(),
        }
    }
}

impl From<&DomainError> for FailureKind {
    fn from(error: &DomainError) -> Self {
        match error {
            DomainError::MalformedBody(_) => Self::MalformedBodyError,
            DomainError::InvalidRequest(_)
            | DomainError::UnsupportedMethod(_)
            | DomainError::InvalidJsonPath { .. }
            | DomainError::InvalidConfig(_) => Self::InvalidRequestError,
        }
    }
}

/// Outcome of one spec. `passed` is true iff `failures` is empty.
///
/// Only built through [`SpecResult::new`] and its `with_*` methods, so it
/// is serialize-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecResult {
    name: String,
    passed: bool,
    failures: Vec<Failure>,
    duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    attempts: u32,
    started_at: DateTime<Utc>,
}

impl SpecResult {
    /// Creates a result; `passed` is derived from `failures`.
    #[must_use]
    pub fn new(name: impl Into<String>, failures: Vec<Failure>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            passed: failures.is_empty(),
            failures,
            duration_ms,
            status: None,
            attempts: 1,
            started_at: Utc::now(),
        }
    }

    /// A failed result carrying a single failure.
    #[must_use]
    pub fn failed(name: impl Into<String>, failure: Failure, duration_ms: u64) -> Self {
        Self::new(name, vec![failure], duration_ms)
    }

    /// Records the response status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Records the total duration.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Records how many executor attempts were made.
    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Records when the spec started.
    #[must_use]
    pub const fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Appends a failure produced after evaluation (e.g. a failed capture).
    #[must_use]
    pub fn with_failure(mut self, failure: Failure) -> Self {
        self.failures.push(failure);
        self.passed = false;
        self
    }

    /// Spec name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether every expectation held.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Failures in declaration order.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Response status, if a response was captured.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Number of executor attempts.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Aggregate of one suite run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSummary {
    /// Suite name.
    pub suite_name: String,
    /// Identifier of this run.
    pub run_id: Uuid,
    /// Number of specs run.
    pub total: usize,
    /// Number of passing specs.
    pub passed: usize,
    /// Number of failing specs.
    pub failed: usize,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
    /// Individual results in run order.
    pub results: Vec<SpecResult>,
}

impl SuiteSummary {
    /// Builds a summary from results.
    #[must_use]
    pub fn new(
        suite_name: impl Into<String>,
        run_id: Uuid,
        results: Vec<SpecResult>,
        duration_ms: u64,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            suite_name: suite_name.into(),
            run_id,
            total,
            passed,
            failed: total - passed,
            duration_ms,
            results,
        }
    }

    /// Check if all specs passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
