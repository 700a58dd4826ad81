//! Transport codec for SAML binding payloads.
//!
//! Both bindings base64-encode the message; HTTP-Redirect additionally
//! compresses it with raw DEFLATE (no zlib header or trailer).

use std::io::{Read, Write};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};

/// Standard alphabet, canonical padding, tolerant of non-zero trailing bits
/// (e.g. `QR==`) as many service-provider encoders emit them.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Reverses base64 encoding of the value carried by `field`.
///
/// ASCII whitespace is stripped first, since form posts commonly wrap long
/// base64 values across lines.
pub fn decode_plain(field: &str, value: &str) -> IngestResult<Vec<u8>> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    LENIENT.decode(compact)
        .map_err(|e| {
            tracing::debug!(field, error = %e, "base64 decoding failed");
            IngestError::decode(field)
        })
}

/// Reverses base64 encoding and interprets the result as UTF-8 text.
pub fn decode_plain_text(field: &str, value: &str) -> IngestResult<String> {
    let bytes = decode_plain(field, value)?;
    into_utf8(field, bytes)
}

/// Reverses base64 encoding followed by raw DEFLATE compression.
///
/// Inflation stops at the default `max_document_bytes`; see
/// [`decode_compressed_limited`].
pub fn decode_compressed(field: &str, value: &str) -> IngestResult<String> {
    decode_compressed_limited(field, value, IngestConfig::default().max_document_bytes)
}

/// Like [`decode_compressed`], failing once the inflated document would
/// exceed `max_bytes`.
pub fn decode_compressed_limited(
    field: &str,
    value: &str,
    max_bytes: usize,
) -> IngestResult<String> {
    let compressed = decode_plain(field, value)?;

    let cap = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut decoder = DeflateDecoder::new(compressed.as_slice()).take(cap);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated).map_err(|e| {
        tracing::debug!(field, error = %e, "deflate decompression failed");
        IngestError::decode(field)
    })?;

    if inflated.len() > max_bytes {
        tracing::debug!(field, max_bytes, "inflated payload exceeds document limit");
        return Err(IngestError::decode(field));
    }

    into_utf8(field, inflated)
}

/// Base64-encodes `data`, the inverse of [`decode_plain`].
#[must_use]
pub fn encode_plain(data: impl AsRef<[u8]>) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// Compresses `text` with raw DEFLATE and base64-encodes it, the inverse of
/// [`decode_compressed`].
pub fn encode_compressed(text: &str) -> std::io::Result<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(encode_plain(compressed))
}

fn into_utf8(field: &str, bytes: Vec<u8>) -> IngestResult<String> {
    String::from_utf8(bytes).map_err(|e| {
        tracing::debug!(field, error = %e, "payload is not valid UTF-8");
        IngestError::decode(field)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_roundtrip() {
        let xml = r#"<samlp:AuthnRequest ID="_1">è unicode</samlp:AuthnRequest>"#;
        let encoded = encode_compressed(xml).unwrap();
        assert_eq!(decode_compressed("SAMLRequest", &encoded).unwrap(), xml);
    }

    #[test]
    fn plain_roundtrip() {
        let xml = "<Test/>";
        let encoded = encode_plain(xml);
        assert_eq!(decode_plain_text("SAMLRequest", &encoded).unwrap(), xml);
    }

    #[test]
    fn plain_tolerates_line_wrapping() {
        let encoded = encode_plain("<AuthnRequest>wrapped payload</AuthnRequest>");
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{head}\r\n{tail}\n");
        assert_eq!(
            decode_plain_text("SAMLRequest", &wrapped).unwrap(),
            "<AuthnRequest>wrapped payload</AuthnRequest>"
        );
    }

    #[test]
    fn invalid_base64_names_field() {
        let err = decode_plain("Signature", "not*base64!").unwrap_err();
        assert!(matches!(err, IngestError::Decode { ref field } if field == "Signature"));
    }

    #[test]
    fn corrupt_deflate_stream_is_a_decode_error() {
        // Reserved block type 0b11 is never valid DEFLATE.
        let encoded = encode_plain([0xffu8, 0xff, 0xff, 0xff]);
        let err = decode_compressed("SAMLRequest", &encoded).unwrap_err();
        assert!(matches!(err, IngestError::Decode { ref field } if field == "SAMLRequest"));
    }

    #[test]
    fn inflation_is_bounded() {
        let bomb = "a".repeat(4 * 1024 * 1024);
        let encoded = encode_compressed(&bomb).unwrap();
        assert!(encoded.len() < 64 * 1024);

        let err = decode_compressed("SAMLRequest", &encoded).unwrap_err();
        assert!(matches!(err, IngestError::Decode { ref field } if field == "SAMLRequest"));
    }

    #[test]
    fn inflation_limit_is_inclusive() {
        let encoded = encode_compressed("abcdefgh").unwrap();
        assert_eq!(
            decode_compressed_limited("SAMLRequest", &encoded, 8).unwrap(),
            "abcdefgh"
        );
        assert!(decode_compressed_limited("SAMLRequest", &encoded, 7).is_err());
    }

    #[test]
    fn non_canonical_trailing_bits_are_accepted() {
        assert_eq!(decode_plain("Signature", "QR==").unwrap(), b"A");
        assert_eq!(decode_plain("Signature", "QQ==").unwrap(), b"A");
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let encoded = encode_plain([0xc3u8, 0x28]);
        let err = decode_plain_text("SAMLRequest", &encoded).unwrap_err();
        assert!(matches!(err, IngestError::Decode { .. }));
    }
}
