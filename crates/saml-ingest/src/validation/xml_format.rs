//! Well-formedness check.

use crate::bindings::{RawRequest, SamlPayload};
use crate::error::IngestError;
use crate::tree::DocumentNode;

use super::{ValidationError, Validator};

/// Rejects requests whose document is not well-formed XML.
///
/// Failures are blocking: content validators further down the pipeline may
/// assume a parseable document.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormatValidator;

impl Validator for XmlFormatValidator {
    fn validate(&self, request: &RawRequest) -> Result<(), ValidationError> {
        match DocumentNode::build(request.saml_request()) {
            Ok(_) => Ok(()),
            Err(IngestError::XmlSyntax(reason)) => Err(ValidationError::blocking([format!(
                "SAMLRequest is not well-formed XML: {reason}"
            )])),
            Err(other) => Err(ValidationError::blocking([other.to_string()])),
        }
    }

    fn name(&self) -> &str {
        "xml_format"
    }
}
