//! Request specification type

use std::time::Duration;

use serde::Serialize;
use url::Url;

use super::{Headers, HttpMethod, QueryParams, RequestBody};
use crate::error::{DomainError, DomainResult};

/// A finalized, immutable HTTP request.
///
/// Only [`RequestBuilder::build`](super::RequestBuilder::build) creates one,
/// so every instance has a method, a non-empty path, a resolvable target and
/// a positive timeout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSpec {
    pub(super) method: HttpMethod,
    pub(super) base_url: Option<String>,
    pub(super) path: String,
    pub(super) query: QueryParams,
    pub(super) headers: Headers,
    pub(super) body: Option<RequestBody>,
    pub(super) timeout_ms: u64,
}

impl RequestSpec {
    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Base URL the path is resolved against, if the path is relative.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Request path (or absolute URL).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters.
    #[must_use]
    pub const fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Request body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Timeout budget in milliseconds.
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Timeout budget as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolves the full target URL including query parameters.
    ///
    /// An absolute `http(s)://` path is used as-is; otherwise the path is
    /// appended to the base URL, keeping any path prefix the base carries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the result is not a valid URL.
    pub fn url(&self) -> DomainResult<Url> {
        let raw = if is_absolute(&self.path) {
            self.path.trim().to_string()
        } else {
            let base = self.base_url.as_deref().ok_or_else(|| {
                DomainError::invalid_request(format!("no base URL for relative path '{}'", self.path))
            })?;
            format!(
                "{}/{}",
                base.trim().trim_end_matches('/'),
                self.path.trim().trim_start_matches('/')
            )
        };

        let mut url = Url::parse(&raw)
            .map_err(|e| DomainError::invalid_request(format!("invalid URL '{raw}': {e}")))?;

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in self.query.iter() {
                pairs.append_pair(&param.key, &param.value);
            }
        }

        Ok(url)
    }
}

pub(super) fn is_absolute(path: &str) -> bool {
    let path = path.trim_start();
    path.starts_with("http://") || path.starts_with("https://")
}
