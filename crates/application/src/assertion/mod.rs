//! Assertion engine.
//!
//! Evaluates declared expectations against a captured response. Every
//! expectation is evaluated, in declaration order, even after an earlier one
//! failed; each violated expectation contributes exactly one [`Failure`].

mod json_like;
mod schema;

use covenant_domain::{
    ArrayOrder, DomainError, Expectation, Failure, JsonPath, ResponseCapture, SpecResult,
};
use regex::Regex;
use serde_json::Value;

pub use json_like::{json_equals, json_like};

/// Stateless evaluator for [`Expectation`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssertionEngine;

impl AssertionEngine {
    /// Create a new engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates all expectations and produces the spec result. The result
    /// duration is the response's elapsed time; callers that measure the
    /// whole spec overwrite it.
    #[must_use]
    pub fn evaluate(
        &self,
        name: &str,
        response: &ResponseCapture,
        expectations: &[Expectation],
    ) -> SpecResult {
        let failures = expectations
            .iter()
            .filter_map(|expectation| self.check(expectation, response))
            .collect();
        SpecResult::new(name, failures, response.elapsed_ms()).with_status(response.status())
    }

    /// Evaluates one expectation, returning the failure if it does not hold.
    #[must_use]
    pub fn check(&self, expectation: &Expectation, response: &ResponseCapture) -> Option<Failure> {
        match expectation {
            Expectation::StatusEquals { code } => Self::check_status(expectation, response, *code),
            Expectation::HeaderContains { name, substring } => {
                Self::check_header(expectation, response, name, |actual| {
                    (!actual.contains(substring.as_str()))
                        .then(|| format!("header '{name}' value '{actual}' does not contain '{substring}'"))
                })
            }
            Expectation::HeaderEquals { name, value } => {
                Self::check_header(expectation, response, name, |actual| {
                    (actual != value)
                        .then(|| format!("header '{name}' expected '{value}', got '{actual}'"))
                })
            }
            Expectation::HeaderMatches { name, pattern } => match Regex::new(pattern) {
                Ok(regex) => Self::check_header(expectation, response, name, |actual| {
                    (!regex.is_match(actual))
                        .then(|| format!("header '{name}' value '{actual}' does not match /{pattern}/"))
                }),
                Err(e) => Some(Failure::assertion(
                    expectation,
                    format!("invalid pattern /{pattern}/: {e}"),
                )),
            },
            Expectation::BodyContains { substring } => {
                let body = response.body_text();
                (!body.contains(substring.as_str())).then(|| {
                    Failure::assertion(
                        expectation,
                        format!("body does not contain '{substring}' (body: {})", preview(&body)),
                    )
                })
            }
            Expectation::BodyMatches { pattern } => match Regex::new(pattern) {
                Ok(regex) => {
                    let body = response.body_text();
                    (!regex.is_match(&body)).then(|| {
                        Failure::assertion(
                            expectation,
                            format!("body does not match /{pattern}/ (body: {})", preview(&body)),
                        )
                    })
                }
                Err(e) => Some(Failure::assertion(
                    expectation,
                    format!("invalid pattern /{pattern}/: {e}"),
                )),
            },
            Expectation::JsonLike { shape, array_order } => {
                Self::with_json(expectation, response, |body| {
                    Self::mismatches(expectation, body, shape, *array_order)
                })
            }
            Expectation::JsonLikeAt {
                path,
                shape,
                array_order,
            } => Self::with_json(expectation, response, |body| {
                Self::check_json_like_at(expectation, body, path, shape, *array_order)
            }),
            Expectation::JsonEquals { value } => Self::with_json(expectation, response, |body| {
                (!json_equals(body, value)).then(|| {
                    Failure::assertion(expectation, format!("expected JSON {value}, got {body}"))
                })
            }),
            Expectation::JsonSchema { schema } => Self::with_json(expectation, response, |body| {
                match schema::compile(schema) {
                    Ok(validator) => {
                        let violations = schema::violations(&validator, body);
                        (!violations.is_empty())
                            .then(|| Failure::assertion_with_details(expectation, violations))
                    }
                    Err(message) => Some(Failure::assertion(expectation, message)),
                }
            }),
            Expectation::ResponseTimeUnder { max_ms } => {
                let actual = response.elapsed_ms();
                (actual >= *max_ms).then(|| {
                    Failure::assertion(
                        expectation,
                        format!("expected response time under {max_ms}ms, got {actual}ms"),
                    )
                })
            }
        }
    }

    fn check_status(expectation: &Expectation, response: &ResponseCapture, code: u16) -> Option<Failure> {
        let actual = response.status();
        (actual != code).then(|| {
            Failure::assertion(expectation, format!("expected status {code}, got {actual}"))
        })
    }

    /// Looks the header up and hands its value to `compare`, which returns a
    /// message when the value is unacceptable. A missing header is its own
    /// failure, separate from a value mismatch.
    fn check_header<F>(
        expectation: &Expectation,
        response: &ResponseCapture,
        name: &str,
        compare: F,
    ) -> Option<Failure>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match response.header(name) {
            Some(actual) => compare(actual).map(|message| Failure::assertion(expectation, message)),
            None => Some(Failure::assertion(expectation, format!("header '{name}' not found"))),
        }
    }

    /// Parses the body and runs `check` on it; a parse failure becomes a
    /// `MalformedBodyError` for this expectation only.
    fn with_json<F>(expectation: &Expectation, response: &ResponseCapture, check: F) -> Option<Failure>
    where
        F: FnOnce(&Value) -> Option<Failure>,
    {
        match response.json() {
            Ok(body) => check(body),
            Err(DomainError::MalformedBody(reason)) => Some(Failure::malformed_body(expectation, &reason)),
            Err(other) => Some(Failure::assertion(expectation, other.to_string())),
        }
    }

    fn check_json_like_at(
        expectation: &Expectation,
        body: &Value,
        path: &str,
        shape: &Value,
        order: ArrayOrder,
    ) -> Option<Failure> {
        let parsed = match JsonPath::parse(path) {
            Ok(parsed) => parsed,
            Err(e) => return Some(Failure::assertion(expectation, e.to_string())),
        };
        match parsed.query(body) {
            Some(value) => Self::mismatches(expectation, value, shape, order),
            None => Some(Failure::assertion(expectation, format!("no value at {parsed}"))),
        }
    }

    fn mismatches(
        expectation: &Expectation,
        actual: &Value,
        shape: &Value,
        order: ArrayOrder,
    ) -> Option<Failure> {
        let details = json_like(actual, shape, order);
        (!details.is_empty()).then(|| Failure::assertion_with_details(expectation, details))
    }
}

/// First 100 characters of a body, for failure messages.
fn preview(body: &str) -> String {
    const LIMIT: usize = 100;
    if body.chars().count() > LIMIT {
        format!("{}...", body.chars().take(LIMIT).collect::<String>())
    } else {
        body.to_string()
    }
}
