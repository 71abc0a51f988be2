//! Suite configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults (`https://v2.jokeapi.dev`, 90 s)
//! 2. a YAML file named by `COVENANT_CONFIG`
//! 3. `COVENANT_BASE_URL` and `COVENANT_TIMEOUT_MS`

use std::path::{Path, PathBuf};

use covenant_domain::{DomainError, SuiteConfig};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Environment variable naming the YAML configuration file.
pub const CONFIG_FILE_VAR: &str = "COVENANT_CONFIG";
/// Environment variable overriding the base URL.
pub const BASE_URL_VAR: &str = "COVENANT_BASE_URL";
/// Environment variable overriding the default timeout in milliseconds.
pub const TIMEOUT_VAR: &str = "COVENANT_TIMEOUT_MS";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for a suite configuration.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_yaml::Error,
    },

    /// An environment override has the wrong format.
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidOverride {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },

    /// The merged configuration is unusable.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads configuration from the process environment.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read or parsed, an
/// override is malformed, or the result fails validation.
pub async fn load() -> ConfigResult<SuiteConfig> {
    load_with(|name| std::env::var(name).ok()).await
}

/// Loads configuration reading variables through `var`.
///
/// # Errors
///
/// See [`load`].
pub async fn load_with<F>(var: F) -> ConfigResult<SuiteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match var(CONFIG_FILE_VAR).filter(|p| !p.trim().is_empty()) {
        Some(path) => from_file(Path::new(&path)).await?,
        None => SuiteConfig::default(),
    };

    if let Some(base_url) = var(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
        config.base_url = base_url.trim().to_string();
    }
    if let Some(raw) = var(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
        config.default_timeout_ms = raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(ConfigError::InvalidOverride {
                name: TIMEOUT_VAR,
                value: raw,
            })?;
    }

    config.validate()?;
    debug!(
        base_url = %config.base_url,
        timeout_ms = config.default_timeout_ms,
        "configuration loaded"
    );
    Ok(config)
}

/// Reads a YAML configuration file. Missing keys take their defaults.
///
/// # Errors
///
/// Returns `NotFound`, `Io` or `Parse`.
pub async fn from_file(path: &Path) -> ConfigResult<SuiteConfig> {
    let contents = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
