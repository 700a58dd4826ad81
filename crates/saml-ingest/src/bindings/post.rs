//! HTTP-POST Binding extraction.
//!
//! The AuthnRequest travels base64-encoded in an HTML form field, without
//! compression. Any signature is embedded in the document itself.

use crate::codec;
use crate::error::IngestResult;

use super::{FieldSource, PostRequest, SAML_REQUEST};

/// HTTP-POST binding extractor.
pub struct HttpPostExtractor;

impl HttpPostExtractor {
    /// Extracts a [`PostRequest`] from form fields.
    pub fn extract<S: FieldSource + ?Sized>(source: &S) -> IngestResult<PostRequest> {
        let saml_request = codec::decode_plain_text(SAML_REQUEST, source.require(SAML_REQUEST)?)?;

        tracing::debug!(
            binding = "HTTP-POST",
            document_len = saml_request.len(),
            "extracted SAML request"
        );

        Ok(PostRequest::new(saml_request))
    }

    /// Builds the form body a service provider would post.
    #[must_use]
    pub fn encode_form(xml: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair(SAML_REQUEST, &codec::encode_plain(xml))
            .finish()
    }
}
