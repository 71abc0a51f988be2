//! Fluent request builder
//!
//! A `RequestBuilder` is mutable and cheap to clone; calling [`RequestBuilder::build`]
//! freezes it into a [`RequestSpec`].

use std::fmt::Display;
use std::time::Duration;

use serde_json::Value;

use super::spec::is_absolute;
use super::{Headers, HttpMethod, QueryParams, RequestBody, RequestSpec};
use crate::config::SuiteConfig;
use crate::error::{DomainError, DomainResult};

/// Accumulates the parts of one HTTP call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBuilder {
    method: Option<HttpMethod>,
    base_url: Option<String>,
    path: Option<String>,
    query: QueryParams,
    headers: Headers,
    body: Option<RequestBody>,
    timeout_ms: Option<u64>,
}

impl RequestBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the request path, or an absolute URL.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the base URL relative paths resolve against.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// `GET path`.
    #[must_use]
    pub fn get(self, path: impl Into<String>) -> Self {
        self.method(HttpMethod::Get).path(path)
    }

    /// `POST path`.
    #[must_use]
    pub fn post(self, path: impl Into<String>) -> Self {
        self.method(HttpMethod::Post).path(path)
    }

    /// `PUT path`.
    #[must_use]
    pub fn put(self, path: impl Into<String>) -> Self {
        self.method(HttpMethod::Put).path(path)
    }

    /// `PATCH path`.
    #[must_use]
    pub fn patch(self, path: impl Into<String>) -> Self {
        self.method(HttpMethod::Patch).path(path)
    }

    /// `DELETE path`.
    #[must_use]
    pub fn delete(self, path: impl Into<String>) -> Self {
        self.method(HttpMethod::Delete).path(path)
    }

    /// Adds a query parameter; last write wins per key.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.set(key, value);
        self
    }

    /// Adds a header; names compare case-insensitively and last write wins.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets a raw body, discarding any previous body.
    #[must_use]
    pub fn body(mut self, content: impl Into<String>) -> Self {
        self.body = Some(RequestBody::raw(content));
        self
    }

    /// Sets a structured JSON body, discarding any previous body.
    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.body = Some(RequestBody::json(value));
        self
    }

    /// Overrides the suite-wide timeout for this request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Fills the base URL and timeout from the suite configuration where
    /// this builder does not set its own.
    #[must_use]
    pub fn with_defaults(mut self, config: &SuiteConfig) -> Self {
        if self.base_url.is_none() {
            self.base_url = Some(config.base_url.clone());
        }
        if self.timeout_ms.is_none() {
            self.timeout_ms = Some(config.default_timeout_ms);
        }
        self
    }

    /// Rewrites every textual part of the request through `resolve`:
    /// path, query values, header values, raw body text and the string
    /// leaves of a JSON body.
    ///
    /// A JSON string leaf is replaced by the resolved value itself, so a
    /// resolver may turn `"{{id}}"` into the number `42`. Everywhere else a
    /// string value is inserted as is and any other value as compact JSON.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `resolve`.
    pub fn interpolate<F>(mut self, mut resolve: F) -> DomainResult<Self>
    where
        F: FnMut(&str) -> DomainResult<Value>,
    {
        if let Some(path) = self.path.as_mut() {
            *path = resolve(path).map(render)?;
        }
        for value in self.query.values_mut() {
            *value = resolve(value).map(render)?;
        }
        for value in self.headers.values_mut() {
            *value = resolve(value).map(render)?;
        }
        match self.body.as_mut() {
            Some(RequestBody::Raw { content, .. }) => *content = resolve(content).map(render)?,
            Some(RequestBody::Json { value }) => interpolate_json(value, &mut resolve)?,
            None => {}
        }
        Ok(self)
    }

    /// Freezes the builder into a [`RequestSpec`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the method or path is missing, the
    /// path is blank, a relative path has no base URL, or the timeout is
    /// zero or unset.
    pub fn build(&self) -> DomainResult<RequestSpec> {
        let method = self
            .method
            .ok_or_else(|| DomainError::invalid_request("no HTTP method set"))?;
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| DomainError::invalid_request("no path set"))?;
        if path.trim().is_empty() {
            return Err(DomainError::invalid_request("path is empty"));
        }
        if !is_absolute(path) && self.base_url.as_deref().is_none_or(|b| b.trim().is_empty()) {
            return Err(DomainError::invalid_request(format!(
                "relative path '{path}' requires a base URL"
            )));
        }
        let timeout_ms = match self.timeout_ms {
            Some(0) => return Err(DomainError::invalid_request("timeout must be positive")),
            Some(ms) => ms,
            None => return Err(DomainError::invalid_request("no timeout set")),
        };

        let spec = RequestSpec {
            method,
            base_url: self.base_url.clone(),
            path: path.to_string(),
            query: self.query.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            timeout_ms,
        };
        // Reject unparseable targets now rather than at dispatch.
        spec.url()?;
        Ok(spec)
    }
}

fn render(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn interpolate_json<F>(value: &mut Value, resolve: &mut F) -> DomainResult<()>
where
    F: FnMut(&str) -> DomainResult<Value>,
{
    match value {
        Value::String(text) => *value = resolve(text)?,
        Value::Array(items) => {
            for item in items {
                interpolate_json(item, resolve)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                interpolate_json(item, resolve)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}
