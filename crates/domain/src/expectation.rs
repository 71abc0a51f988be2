//! Declarative expectations against a captured response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How arrays inside a `JsonLike` shape are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayOrder {
    /// Shape element `i` must match actual element `i`.
    #[default]
    Ordered,
    /// Each shape element must match a distinct actual element, in any position.
    Unordered,
}

/// A single check against a captured response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    /// Status code equals `code` exactly.
    StatusEquals {
        /// Expected status code.
        code: u16,
    },
    /// Header `name` (case-insensitive) exists and contains `substring`.
    HeaderContains {
        /// Header name.
        name: String,
        /// Case-sensitive substring.
        substring: String,
    },
    /// Header `name` (case-insensitive) exists and equals `value`.
    HeaderEquals {
        /// Header name.
        name: String,
        /// Expected value.
        value: String,
    },
    /// Header `name` (case-insensitive) exists and matches a regex.
    HeaderMatches {
        /// Header name.
        name: String,
        /// Regular expression.
        pattern: String,
    },
    /// Raw body text contains `substring`.
    BodyContains {
        /// Case-sensitive substring.
        substring: String,
    },
    /// Raw body text matches a regex.
    BodyMatches {
        /// Regular expression.
        pattern: String,
    },
    /// Parsed body partially matches `shape`.
    JsonLike {
        /// Partial document; extra keys in the body are ignored.
        shape: Value,
        /// Array comparison mode.
        #[serde(default)]
        array_order: ArrayOrder,
    },
    /// The value at `path` partially matches `shape`.
    JsonLikeAt {
        /// JSON path, e.g. `$.jokes[0]`.
        path: String,
        /// Partial document.
        shape: Value,
        /// Array comparison mode.
        #[serde(default)]
        array_order: ArrayOrder,
    },
    /// Parsed body deep-equals `value`.
    JsonEquals {
        /// Expected document.
        value: Value,
    },
    /// Parsed body validates against a JSON Schema document.
    JsonSchema {
        /// Schema document.
        schema: Value,
    },
    /// Response arrived in strictly less than `max_ms` milliseconds.
    ResponseTimeUnder {
        /// Exclusive upper bound in milliseconds.
        max_ms: u64,
    },
}

impl Expectation {
    /// `StatusEquals(code)`.
    #[must_use]
    pub const fn status(code: u16) -> Self {
        Self::StatusEquals { code }
    }

    /// `HeaderContains(name, substring)`.
    #[must_use]
    pub fn header_contains(name: impl Into<String>, substring: impl Into<String>) -> Self {
        Self::HeaderContains {
            name: name.into(),
            substring: substring.into(),
        }
    }

    /// `HeaderEquals(name, value)`.
    #[must_use]
    pub fn header_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::HeaderEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `HeaderMatches(name, pattern)`.
    #[must_use]
    pub fn header_matches(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::HeaderMatches {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// `BodyMatches(pattern)`.
    #[must_use]
    pub fn body_matches(pattern: impl Into<String>) -> Self {
        Self::BodyMatches {
            pattern: pattern.into(),
        }
    }

    /// `BodyContains(substring)`.
    #[must_use]
    pub fn body_contains(substring: impl Into<String>) -> Self {
        Self::BodyContains {
            substring: substring.into(),
        }
    }

    /// `JsonLike(shape)` with ordered arrays.
    #[must_use]
    pub const fn json_like(shape: Value) -> Self {
        Self::JsonLike {
            shape,
            array_order: ArrayOrder::Ordered,
        }
    }

    /// `JsonLike(shape)` with unordered arrays.
    #[must_use]
    pub const fn json_like_unordered(shape: Value) -> Self {
        Self::JsonLike {
            shape,
            array_order: ArrayOrder::Unordered,
        }
    }

    /// `JsonLikeAt(path, shape)` with ordered arrays.
    #[must_use]
    pub fn json_like_at(path: impl Into<String>, shape: Value) -> Self {
        Self::JsonLikeAt {
            path: path.into(),
            shape,
            array_order: ArrayOrder::Ordered,
        }
    }

    /// `JsonEquals(value)`.
    #[must_use]
    pub const fn json_equals(value: Value) -> Self {
        Self::JsonEquals { value }
    }

    /// `JsonSchema(schema)`.
    #[must_use]
    pub const fn json_schema(schema: Value) -> Self {
        Self::JsonSchema { schema }
    }

    /// `ResponseTimeUnder(max_ms)`.
    #[must_use]
    pub const fn response_time_under(max_ms: u64) -> Self {
        Self::ResponseTimeUnder { max_ms }
    }

    /// Returns true if evaluating this expectation parses the body as JSON.
    #[must_use]
    pub const fn reads_json(&self) -> bool {
        matches!(
            self,
            Self::JsonLike { .. }
                | Self::JsonLikeAt { .. }
                | Self::JsonEquals { .. }
                | Self::JsonSchema { .. }
        )
    }

    /// Get a human-readable description of this expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusEquals { code } => format!("status is {code}"),
            Self::HeaderContains { name, substring } => {
                format!("header '{name}' contains '{substring}'")
            }
            Self::HeaderEquals { name, value } => format!("header '{name}' equals '{value}'"),
            Self::HeaderMatches { name, pattern } => format!("header '{name}' matches /{pattern}/"),
            Self::BodyContains { substring } => format!("body contains '{substring}'"),
            Self::BodyMatches { pattern } => format!("body matches /{pattern}/"),
            Self::JsonLike { shape, .. } => format!("JSON like {shape}"),
            Self::JsonLikeAt { path, shape, .. } => format!("JSON at {path} like {shape}"),
            Self::JsonEquals { value } => format!("JSON equals {value}"),
            Self::JsonSchema { .. } => "JSON matches schema".to_string(),
            Self::ResponseTimeUnder { max_ms } => format!("response time < {max_ms}ms"),
        }
    }
}
