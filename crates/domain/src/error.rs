//! Domain error types

use thiserror::Error;

/// Errors raised while assembling requests or reading captured responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The request could not be finalized (missing method, empty path, bad URL, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body was requested as JSON but does not parse.
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A JSON path expression could not be parsed.
    #[error("invalid JSON path '{path}': {reason}")]
    InvalidJsonPath {
        /// The offending expression.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The suite configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
