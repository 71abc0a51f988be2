//! Captured HTTP responses.
//!
//! A `ResponseCapture` holds exactly what came off the wire. The body is kept
//! as raw bytes; JSON parsing happens on first access and is cached, so a
//! body that is not JSON only becomes an error for the caller that asks for
//! JSON.

use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;

use crate::error::{DomainError, DomainResult};
use crate::request::Headers;

/// An immutable snapshot of one HTTP response.
#[derive(Debug, Clone)]
pub struct ResponseCapture {
    status: u16,
    headers: Headers,
    body: Vec<u8>,
    elapsed: Duration,
    json: OnceLock<Result<Value, String>>,
}

impl ResponseCapture {
    /// Creates a capture from raw response data. Repeated header names are
    /// folded into one comma-separated value.
    #[must_use]
    pub fn new<I, K, V>(status: u16, headers: I, body: Vec<u8>, elapsed: Duration) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            status,
            headers: headers.into_iter().collect(),
            body,
            elapsed,
            json: OnceLock::new(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Content-Type header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body as text; invalid UTF-8 sequences are replaced.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Parsed JSON body. Parsing happens once, on the first call.
    ///
    /// # Errors
    ///
    /// Returns `MalformedBody` if the body is not valid JSON.
    pub fn json(&self) -> DomainResult<&Value> {
        self.json
            .get_or_init(|| serde_json::from_slice(&self.body).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|reason| DomainError::MalformedBody(reason.clone()))
    }

    /// Wall-clock time from dispatch to full body receipt.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in whole milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}
