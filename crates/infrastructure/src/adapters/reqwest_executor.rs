//! Executor implementation using reqwest.
//!
//! The request deadline covers dispatch through full body receipt. When it
//! expires the in-flight future is dropped, which releases the connection.

use std::error::Error as _;
use std::time::Instant;

use async_trait::async_trait;
use covenant_application::{ExecuteError, ExecuteResult, Executor};
use covenant_domain::{HttpMethod, RequestSpec, ResponseCapture};
use reqwest::{Client, Method, Url};
use tracing::{debug, warn};

/// Value of the `User-Agent` header sent unless a spec sets its own.
pub const USER_AGENT: &str = concat!("covenant/", env!("CARGO_PKG_VERSION"));

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// HTTP executor backed by `reqwest::Client`.
///
/// Default configuration:
/// - Follow redirects: up to 10
/// - TLS verification: enabled (rustls)
/// - User-Agent: `covenant/<version>`
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    /// Creates an executor with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> ExecuteResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ExecuteError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps a preconfigured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn prepare(&self, request: &RequestSpec, url: Url) -> ExecuteResult<reqwest::RequestBuilder> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method()), url);

        for header in request.headers().iter() {
            builder = builder.header(&header.name, &header.value);
        }

        if let Some(body) = request.body() {
            if let Some(content_type) = body.content_type()
                && !request.headers().contains("content-type")
            {
                builder = builder.header("Content-Type", content_type);
            }
            builder = builder.body(body.to_bytes()?);
        }

        Ok(builder)
    }

    /// Maps reqwest errors onto `ExecuteError`, keeping the network cause
    /// distinct from a timeout.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> ExecuteError {
        if error.is_timeout() {
            return ExecuteError::Timeout { timeout_ms };
        }

        let message = describe(error);
        let host = || {
            error
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return ExecuteError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lowered.contains("refused") {
                return ExecuteError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            if lowered.contains("certificate") || lowered.contains("tls") {
                return ExecuteError::Tls(message);
            }
            return ExecuteError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return ExecuteError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        if error.is_request() || error.is_body() {
            return ExecuteError::ConnectionFailed(message);
        }

        ExecuteError::Other(message)
    }
}

/// Joins an error with its sources; reqwest keeps the useful part
/// ("Connection refused", "dns error") in the source chain.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl Executor for ReqwestExecutor {
    async fn execute(&self, request: &RequestSpec) -> ExecuteResult<ResponseCapture> {
        let url = request.url()?;
        let timeout_ms = request.timeout_ms();
        debug!(
            method = %request.method(),
            url = %url,
            timeout_ms,
            "dispatching request"
        );
        let builder = self.prepare(request, url)?;

        let start = Instant::now();
        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;
            let status = response.status().as_u16();
            let headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;
            Ok::<_, ExecuteError>((status, headers, body.to_vec()))
        };

        let (status, headers, body) = tokio::time::timeout(request.timeout(), exchange)
            .await
            .map_err(|_| {
                warn!(path = request.path(), timeout_ms, "request timed out");
                ExecuteError::Timeout { timeout_ms }
            })??;
        let elapsed = start.elapsed();

        debug!(
            status,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            bytes = body.len(),
            "response captured"
        );

        Ok(ResponseCapture::new(status, headers, body, elapsed))
    }
}
