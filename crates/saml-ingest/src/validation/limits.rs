//! Size and nesting guard.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::bindings::{RawRequest, SamlPayload};
use crate::config::IngestConfig;

use super::{ValidationError, Validator};

/// Rejects documents that are too large or too deeply nested to build.
///
/// The tree builder itself enforces no limit; place this validator first.
/// Malformed documents are left to [`super::XmlFormatValidator`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentLimitsValidator {
    max_document_bytes: usize,
    max_depth: usize,
}

impl DocumentLimitsValidator {
    /// Creates a guard with explicit limits.
    #[must_use]
    pub const fn new(max_document_bytes: usize, max_depth: usize) -> Self {
        Self {
            max_document_bytes,
            max_depth,
        }
    }

    /// Creates a guard from configuration.
    #[must_use]
    pub const fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.max_document_bytes, config.max_depth)
    }
}

impl Default for DocumentLimitsValidator {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

impl Validator for DocumentLimitsValidator {
    fn validate(&self, request: &RawRequest) -> Result<(), ValidationError> {
        let xml = request.saml_request();
        if xml.len() > self.max_document_bytes {
            return Err(ValidationError::blocking([format!(
                "SAMLRequest is {} bytes, limit is {}",
                xml.len(),
                self.max_document_bytes
            )]));
        }

        let depth = max_depth(xml);
        if depth > self.max_depth {
            return Err(ValidationError::blocking([format!(
                "SAMLRequest nests {depth} elements deep, limit is {}",
                self.max_depth
            )]));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "document_limits"
    }
}

/// Deepest element nesting reached before the end of input or the first
/// parse error.
fn max_depth(xml: &str) -> usize {
    let mut reader = Reader::from_str(xml);
    let (mut depth, mut deepest) = (0usize, 0usize);
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            Ok(Event::Empty(_)) => deepest = deepest.max(depth + 1),
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }
    deepest
}
