//! Request validation pipeline.
//!
//! Validators run in the order the caller supplies. A non-blocking failure
//! is recorded and the next validator runs; a blocking failure is recorded
//! and stops the run. Only a run that records nothing proceeds to build the
//! [`DocumentNode`] tree.

mod limits;
mod xml_format;

pub use limits::DocumentLimitsValidator;
pub use xml_format::XmlFormatValidator;

use crate::bindings::{RawRequest, SamlPayload};
use crate::error::{AggregateDeserializationError, IngestResult};
use crate::tree::DocumentNode;

/// Whether a validation failure allows the remaining validators to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recorded; validation continues.
    NonBlocking,
    /// Recorded; validation stops immediately.
    Blocking,
}

/// A failure reported by a [`Validator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Human-readable messages, in the order the validator produced them.
    pub details: Vec<String>,
    /// Whether this failure terminates the run.
    pub severity: Severity,
}

impl ValidationError {
    /// A non-blocking failure.
    pub fn new<I, S>(details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            details: details.into_iter().map(Into::into).collect(),
            severity: Severity::NonBlocking,
        }
    }

    /// A blocking failure: structural problems that make further checks
    /// meaningless.
    pub fn blocking<I, S>(details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            severity: Severity::Blocking,
            ..Self::new(details)
        }
    }

    /// Returns `true` if this failure stops the pipeline.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

/// A stateless check over an extracted request.
///
/// Implementations must not depend on state shared between requests;
/// the pipeline assumes this but cannot enforce it.
pub trait Validator {
    /// Validates `request`.
    fn validate(&self, request: &RawRequest) -> Result<(), ValidationError>;

    /// Name used in log events.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Validator for F
where
    F: Fn(&RawRequest) -> Result<(), ValidationError>,
{
    fn validate(&self, request: &RawRequest) -> Result<(), ValidationError> {
        self(request)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

/// Runs `validators` in order and collects every detail they report.
///
/// Stops after the first blocking failure. Returns the accumulated details,
/// in encounter order, if anything failed.
pub fn validate(
    request: &RawRequest,
    validators: &[&dyn Validator],
) -> Result<(), AggregateDeserializationError> {
    let mut details = Vec::new();

    for validator in validators {
        match validator.validate(request) {
            Ok(()) => {
                tracing::debug!(validator = validator.name(), "validator passed");
            }
            Err(err) if err.is_blocking() => {
                tracing::warn!(
                    validator = validator.name(),
                    details = ?err.details,
                    "blocking validation failure, stopping"
                );
                details.extend(err.details);
                break;
            }
            Err(err) => {
                tracing::debug!(
                    validator = validator.name(),
                    details = ?err.details,
                    "validation failure"
                );
                details.extend(err.details);
            }
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        tracing::warn!(count = details.len(), "request rejected by validators");
        Err(AggregateDeserializationError::new(details))
    }
}

/// Validates `request` and, if it passes, builds its document tree.
pub fn deserialize(request: &RawRequest, validators: &[&dyn Validator]) -> IngestResult<DocumentNode> {
    validate(request, validators)?;
    DocumentNode::build(request.saml_request())
}
