//! HTTP Request body types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// A request payload. Exactly one representation is held at a time, so
/// setting a JSON body discards a raw one and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestBody {
    /// Raw text body sent verbatim.
    Raw {
        /// The body content.
        content: String,
        /// Explicit content type, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
    },
    /// Structured JSON body, serialized at dispatch time.
    Json {
        /// The JSON document.
        value: Value,
    },
}

impl RequestBody {
    /// Creates a raw body without a content type.
    #[must_use]
    pub fn raw(content: impl Into<String>) -> Self {
        Self::Raw {
            content: content.into(),
            content_type: None,
        }
    }

    /// Creates a plain text body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Raw {
            content: content.into(),
            content_type: Some("text/plain".to_string()),
        }
    }

    /// Creates a JSON body.
    #[must_use]
    pub const fn json(value: Value) -> Self {
        Self::Json { value }
    }

    /// Returns the content type implied by the body.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Raw { content_type, .. } => content_type.as_deref(),
            Self::Json { .. } => Some("application/json"),
        }
    }

    /// Serializes the body to the bytes put on the wire.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if a JSON body cannot be serialized.
    pub fn to_bytes(&self) -> DomainResult<Vec<u8>> {
        match self {
            Self::Raw { content, .. } => Ok(content.clone().into_bytes()),
            Self::Json { value } => serde_json::to_vec(value)
                .map_err(|e| DomainError::invalid_request(format!("unserializable JSON body: {e}"))),
        }
    }
}
