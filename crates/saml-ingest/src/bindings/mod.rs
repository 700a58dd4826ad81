//! SAML binding extractors.
//!
//! This module pulls the encoded AuthnRequest out of the transport fields of
//! the two supported bindings:
//!
//! - **HTTP-Redirect Binding** - query parameters `SAMLRequest` (deflated,
//!   base64), `SigAlg` and `Signature` (base64)
//! - **HTTP-POST Binding** - form field `SAMLRequest` (base64)
//!
//! Extraction stops at the first missing or undecodable field; no partial
//! [`RawRequest`] is ever returned.
//!
//! # Usage
//!
//! ```rust,ignore
//! use saml_ingest::bindings::{HttpRedirectExtractor, QueryFields};
//!
//! let fields = QueryFields::parse(query_string);
//! let request = HttpRedirectExtractor::extract(&fields)?;
//! ```

mod post;
mod redirect;

use std::collections::{BTreeMap, HashMap};

pub use post::*;
pub use redirect::*;

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};

/// Field name of the encoded request document.
pub const SAML_REQUEST: &str = "SAMLRequest";
/// Field name of the signature algorithm URI (Redirect binding).
pub const SIG_ALG: &str = "SigAlg";
/// Field name of the detached signature (Redirect binding).
pub const SIGNATURE: &str = "Signature";

/// A key/value source of transport fields (query parameters or form fields).
pub trait FieldSource {
    /// Returns the value stored under `key`, matched case-sensitively.
    fn field(&self, key: &str) -> Option<&str>;

    /// Returns the value under `key` or a [`IngestError::MissingField`].
    fn require(&self, key: &str) -> IngestResult<&str> {
        self.field(key).ok_or_else(|| IngestError::missing_field(key))
    }
}

impl FieldSource for HashMap<String, String> {
    fn field(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn field(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<S: FieldSource + ?Sized> FieldSource for &S {
    fn field(&self, key: &str) -> Option<&str> {
        (**self).field(key)
    }
}

/// Fields parsed from an `application/x-www-form-urlencoded` string.
///
/// Serves both a raw query string and a raw form body. When a key repeats,
/// the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct QueryFields {
    pairs: Vec<(String, String)>,
}

impl QueryFields {
    /// Parses `input`, tolerating a leading `?`.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.strip_prefix('?').unwrap_or(input);
        let pairs = url::form_urlencoded::parse(input.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Parses the query component of a full URL.
    pub fn from_url(url: &str) -> Result<Self, url::ParseError> {
        let parsed = url::Url::parse(url)?;
        Ok(Self::parse(parsed.query().unwrap_or_default()))
    }
}

impl FieldSource for QueryFields {
    fn field(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Capability shared by every extracted request: it carries the decoded
/// request document as text.
pub trait SamlPayload {
    /// The decoded XML document.
    fn saml_request(&self) -> &str;
}

/// Request extracted from the HTTP-Redirect binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRequest {
    saml_request: String,
    sig_alg: String,
    signature: Vec<u8>,
}

impl RedirectRequest {
    /// Assembles a redirect request from already-decoded parts.
    #[must_use]
    pub fn new(saml_request: String, sig_alg: String, signature: Vec<u8>) -> Self {
        Self {
            saml_request,
            sig_alg,
            signature,
        }
    }

    /// The signature algorithm URI, passed through verbatim.
    #[must_use]
    pub fn sig_alg(&self) -> &str {
        &self.sig_alg
    }

    /// The raw decoded signature bytes.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl SamlPayload for RedirectRequest {
    fn saml_request(&self) -> &str {
        &self.saml_request
    }
}

/// Request extracted from the HTTP-POST binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    saml_request: String,
}

impl PostRequest {
    /// Assembles a POST request from the decoded document.
    #[must_use]
    pub fn new(saml_request: String) -> Self {
        Self { saml_request }
    }
}

impl SamlPayload for PostRequest {
    fn saml_request(&self) -> &str {
        &self.saml_request
    }
}

/// An extracted request from either binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRequest {
    /// HTTP-Redirect binding.
    Redirect(RedirectRequest),
    /// HTTP-POST binding.
    Post(PostRequest),
}

impl RawRequest {
    /// The binding this request arrived on.
    #[must_use]
    pub const fn binding(&self) -> Binding {
        match self {
            Self::Redirect(_) => Binding::HttpRedirect,
            Self::Post(_) => Binding::HttpPost,
        }
    }

    /// Returns the redirect-specific fields, if any.
    #[must_use]
    pub const fn as_redirect(&self) -> Option<&RedirectRequest> {
        match self {
            Self::Redirect(request) => Some(request),
            Self::Post(_) => None,
        }
    }
}

impl SamlPayload for RawRequest {
    fn saml_request(&self) -> &str {
        match self {
            Self::Redirect(request) => request.saml_request(),
            Self::Post(request) => request.saml_request(),
        }
    }
}

impl From<RedirectRequest> for RawRequest {
    fn from(request: RedirectRequest) -> Self {
        Self::Redirect(request)
    }
}

impl From<PostRequest> for RawRequest {
    fn from(request: PostRequest) -> Self {
        Self::Post(request)
    }
}

/// SAML transport binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// HTTP-Redirect binding.
    HttpRedirect,
    /// HTTP-POST binding.
    HttpPost,
}

impl Binding {
    /// Returns the binding URN.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
        }
    }

    /// Parses a binding URN.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" => Some(Self::HttpRedirect),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" => Some(Self::HttpPost),
            _ => None,
        }
    }

    /// Extracts a request using this binding's extractor.
    pub fn extract<S: FieldSource + ?Sized>(&self, source: &S) -> IngestResult<RawRequest> {
        self.extract_with_config(source, &IngestConfig::default())
    }

    /// Extracts a request, applying the limits in `config` while decoding.
    pub fn extract_with_config<S: FieldSource + ?Sized>(
        &self,
        source: &S,
        config: &IngestConfig,
    ) -> IngestResult<RawRequest> {
        match self {
            Self::HttpRedirect => {
                HttpRedirectExtractor::extract_with_config(source, config).map(RawRequest::from)
            }
            Self::HttpPost => HttpPostExtractor::extract(source).map(RawRequest::from),
        }
    }
}
