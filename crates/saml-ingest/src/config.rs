//! Ingestion configuration.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};

/// Limits applied to inbound request documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Largest accepted decoded document, in bytes.
    pub max_document_bytes: usize,
    /// Deepest accepted element nesting.
    pub max_depth: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 256 * 1024,
            max_depth: 64,
        }
    }
}

impl IngestConfig {
    /// Loads configuration from environment variables.
    ///
    /// Reads `SAML_INGEST_MAX_DOCUMENT_BYTES` and `SAML_INGEST_MAX_DEPTH`;
    /// unset or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_document_bytes = std::env::var("SAML_INGEST_MAX_DOCUMENT_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_document_bytes);

        let max_depth = std::env::var("SAML_INGEST_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_depth);

        Self {
            max_document_bytes,
            max_depth,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_document_bytes == 0 {
            return Err("max_document_bytes must be greater than zero".to_string());
        }
        if self.max_depth == 0 {
            return Err("max_depth must be greater than zero".to_string());
        }
        Ok(())
    }
}
