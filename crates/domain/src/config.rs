//! Suite-wide configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://v2.jokeapi.dev";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 90_000;

/// Settings shared by every spec in a suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteConfig {
    /// Base URL relative request paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout applied to requests that do not override it.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl SuiteConfig {
    /// Creates a configuration.
    #[must_use]
    pub fn new(base_url: impl Into<String>, default_timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            default_timeout_ms,
        }
    }

    /// The default timeout as a `Duration`.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Checks that the base URL is an absolute http(s) URL and the timeout is positive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> DomainResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            DomainError::InvalidConfig(format!("base URL '{}' is invalid: {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidConfig(format!(
                "base URL '{}' must use http or https",
                self.base_url
            )));
        }
        if self.default_timeout_ms == 0 {
            return Err(DomainError::InvalidConfig(
                "default timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_targets_jokeapi() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "https://v2.jokeapi.dev");
        assert_eq!(config.default_timeout(), Duration::from_secs(90));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: SuiteConfig =
            serde_json::from_str(r#"{"baseUrl": "http://localhost:3000"}"#).unwrap();
        assert_eq!(config.default_timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SuiteConfig::new("not a url", 10).validate().is_err());
        assert!(SuiteConfig::new("ftp://example.com", 10).validate().is_err());
        assert!(SuiteConfig::new("http://example.com", 0).validate().is_err());
    }
}
