//! HTTP-Redirect Binding extraction.
//!
//! The AuthnRequest travels in the query string, DEFLATE-compressed and
//! base64-encoded, alongside a detached signature over the query.

use crate::codec;
use crate::config::IngestConfig;
use crate::error::IngestResult;

use super::{FieldSource, RedirectRequest, SAML_REQUEST, SIGNATURE, SIG_ALG};

/// HTTP-Redirect binding extractor.
pub struct HttpRedirectExtractor;

impl HttpRedirectExtractor {
    /// Extracts a [`RedirectRequest`] from query parameters.
    ///
    /// Fields are processed in the order `SAMLRequest`, `SigAlg`,
    /// `Signature`; the first missing or undecodable one aborts extraction.
    /// `SigAlg` is passed through verbatim and the signature is not
    /// verified here. Inflation is capped at the default document limit.
    pub fn extract<S: FieldSource + ?Sized>(source: &S) -> IngestResult<RedirectRequest> {
        Self::extract_with_config(source, &IngestConfig::default())
    }

    /// Like [`Self::extract`], capping inflation of `SAMLRequest` at
    /// `config.max_document_bytes`.
    pub fn extract_with_config<S: FieldSource + ?Sized>(
        source: &S,
        config: &IngestConfig,
    ) -> IngestResult<RedirectRequest> {
        let saml_request = codec::decode_compressed_limited(
            SAML_REQUEST,
            source.require(SAML_REQUEST)?,
            config.max_document_bytes,
        )?;
        let sig_alg = source.require(SIG_ALG)?.to_string();
        let signature = codec::decode_plain(SIGNATURE, source.require(SIGNATURE)?)?;

        tracing::debug!(
            binding = "HTTP-Redirect",
            document_len = saml_request.len(),
            signature_len = signature.len(),
            sig_alg = %sig_alg,
            "extracted SAML request"
        );

        Ok(RedirectRequest::new(saml_request, sig_alg, signature))
    }

    /// Builds the query string a service provider would send, without URL
    /// signing. `signature` is base64-encoded as-is.
    pub fn encode_query(xml: &str, sig_alg: &str, signature: &[u8]) -> std::io::Result<String> {
        let encoded = codec::encode_compressed(xml)?;
        Ok(url::form_urlencoded::Serializer::new(String::new())
            .append_pair(SAML_REQUEST, &encoded)
            .append_pair(SIG_ALG, sig_alg)
            .append_pair(SIGNATURE, &codec::encode_plain(signature))
            .finish())
    }
}
