//! Ingestion error types.
//!
//! Extraction failures (missing or undecodable transport fields) abort
//! immediately. Validation failures are accumulated by the pipeline and
//! surface as a single [`AggregateDeserializationError`].

use std::fmt;

use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors surfaced to the caller of the ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A protocol-mandated transport field is absent.
    #[error("missing request field: '{field}'")]
    MissingField {
        /// Name of the missing field, e.g. `SAMLRequest`.
        field: String,
    },

    /// A transport field could not be decoded.
    ///
    /// The underlying base64, deflate or UTF-8 failure is deliberately not
    /// carried here.
    #[error("unable to decode field '{field}'")]
    Decode {
        /// Name of the field that failed to decode.
        field: String,
    },

    /// One or more validators rejected the request.
    #[error(transparent)]
    Deserialization(#[from] AggregateDeserializationError),

    /// The request document is not well-formed XML.
    #[error("XML syntax error: {0}")]
    XmlSyntax(String),
}

impl IngestError {
    /// Creates a [`IngestError::MissingField`] for `field`.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates a [`IngestError::Decode`] for `field`.
    pub fn decode(field: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
        }
    }

    /// Returns the SAML top-level status code for this error.
    ///
    /// Every failure in this crate is caused by the requester's message.
    #[must_use]
    pub const fn status_code(&self) -> &'static str {
        "urn:oasis:names:tc:SAML:2.0:status:Requester"
    }

    /// Returns the HTTP status code an outer layer should respond with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MissingField { .. }
            | Self::Decode { .. }
            | Self::Deserialization(_)
            | Self::XmlSyntax(_) => 400,
        }
    }

    /// Returns the human-readable details carried by this error.
    #[must_use]
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::Deserialization(aggregate) => aggregate.details.clone(),
            other => vec![other.to_string()],
        }
    }
}

impl From<quick_xml::Error> for IngestError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlSyntax(err.to_string())
    }
}

/// Every detail collected during one validation run, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateDeserializationError {
    /// Accumulated validator messages.
    pub details: Vec<String>,
}

impl AggregateDeserializationError {
    /// Wraps the accumulated details.
    #[must_use]
    pub fn new(details: Vec<String>) -> Self {
        Self { details }
    }
}

impl fmt::Display for AggregateDeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request validation failed: {}", self.details.join("; "))
    }
}

impl std::error::Error for AggregateDeserializationError {}
