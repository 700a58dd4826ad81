//! SAML AuthnRequest ingestion.
//!
//! This crate recovers the request document from an inbound SAML message and
//! hands it to protocol logic as a generic tree:
//!
//! - **Codec** - base64 and raw DEFLATE transport encodings
//! - **Bindings** - HTTP-Redirect and HTTP-POST field extraction
//! - **Validation** - ordered validator pipeline with blocking failures
//! - **Tree** - schema-less [`DocumentNode`] built from the XML document
//!
//! It does not decide whether a request is authorized; it only recovers
//! structure and gates it on the supplied validators.
//!
//! # Example
//!
//! ```rust,ignore
//! use saml_ingest::bindings::{HttpRedirectExtractor, QueryFields};
//! use saml_ingest::validation::{deserialize, DocumentLimitsValidator, XmlFormatValidator};
//!
//! let request = HttpRedirectExtractor::extract(&QueryFields::parse(query))?.into();
//! let limits = DocumentLimitsValidator::from_config(&IngestConfig::from_env());
//! let tree = deserialize(&request, &[&limits, &XmlFormatValidator])?;
//! let issuer = tree.child("issuer").and_then(|n| n.text());
//! ```
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bindings;
pub mod codec;
pub mod config;
pub mod error;
pub mod tree;
pub mod validation;

pub use bindings::{Binding, RawRequest, SamlPayload};
pub use config::IngestConfig;
pub use error::{AggregateDeserializationError, IngestError, IngestResult};
pub use tree::DocumentNode;
pub use validation::{deserialize, ValidationError, Validator};
