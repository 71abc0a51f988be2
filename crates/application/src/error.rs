//! Application error types

use covenant_domain::{DomainError, FailureKind};
use thiserror::Error;

/// Errors an [`Executor`](crate::ports::Executor) can report instead of a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecuteError {
    /// The request could not be turned into a wire request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No complete response arrived within the budget.
    #[error("no response within {timeout_ms} ms")]
    Timeout {
        /// The budget that expired.
        timeout_ms: u64,
    },

    /// The host name did not resolve.
    #[error("DNS lookup failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying error text.
        message: String,
    },

    /// Nothing was listening on the target port.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The TLS handshake failed.
    #[error("TLS failure: {0}")]
    Tls(String),

    /// The connection could not be established or was dropped mid-response.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Configured limit.
        max: usize,
    },

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl ExecuteError {
    /// Maps the error onto the failure category recorded in results.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidRequest(_) => FailureKind::InvalidRequestError,
            Self::Timeout { .. } => FailureKind::TimeoutError,
            Self::DnsError { .. }
            | Self::ConnectionRefused { .. }
            | Self::Tls(_)
            | Self::ConnectionFailed(_)
            | Self::TooManyRedirects { .. }
            | Self::Other(_) => FailureKind::NetworkError,
        }
    }

    /// Returns true for transport failures a caller may choose to retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), FailureKind::TimeoutError | FailureKind::NetworkError)
    }
}

impl From<DomainError> for ExecuteError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidRequest(message) => Self::InvalidRequest(message),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

/// Result type alias for executor calls.
pub type ExecuteResult<T> = Result<T, ExecuteError>;
