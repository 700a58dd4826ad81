//! End-to-end ingestion tests.
//!
//! Encode a request the way a service provider would, then run it through
//! extraction, validation and tree building.

use saml_ingest::bindings::{
    Binding, HttpPostExtractor, HttpRedirectExtractor, PostRequest, QueryFields,
};
use saml_ingest::validation::{DocumentLimitsValidator, XmlFormatValidator};
use saml_ingest::{deserialize, IngestConfig, IngestError, RawRequest, ValidationError};

const AUTHN_REQUEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
    xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
    ID="_a1b2c3" Version="2.0" IssueInstant="2026-10-18T10:00:00Z"
    Destination="https://idp.example.com/sso" ForceAuthn="true"
    AssertionConsumerServiceIndex="0" AttributeConsumingServiceIndex="1">
    <saml:Issuer NameQualifier="https://sp.example.com"
        Format="urn:oasis:names:tc:SAML:2.0:nameid-format:entity">https://sp.example.com</saml:Issuer>
    <samlp:NameIDPolicy Format="urn:oasis:names:tc:SAML:2.0:nameid-format:transient"/>
    <samlp:RequestedAuthnContext Comparison="minimum">
        <saml:AuthnContextClassRef>https://www.spid.gov.it/SpidL1</saml:AuthnContextClassRef>
    </samlp:RequestedAuthnContext>
</samlp:AuthnRequest>"#;

const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn redirect_request_round_trip() -> anyhow::Result<()> {
    init_tracing();

    let query = HttpRedirectExtractor::encode_query(AUTHN_REQUEST, RSA_SHA256, b"signature")?;
    let request: RawRequest = HttpRedirectExtractor::extract(&QueryFields::parse(&query))?.into();

    let redirect = request.as_redirect().expect("redirect request");
    assert_eq!(redirect.sig_alg(), RSA_SHA256);
    assert_eq!(redirect.signature(), b"signature");

    let tree = deserialize(&request, &[])?;
    assert_eq!(tree.tag, "AuthnRequest");
    assert_eq!(tree.attribute("id"), Some("_a1b2c3"));
    assert_eq!(tree.attribute("forceauthn"), Some("true"));
    assert_eq!(
        tree.child("issuer").and_then(|n| n.text()),
        Some("https://sp.example.com")
    );
    assert_eq!(
        tree.find(&["requestedauthncontext", "authncontextclassref"])
            .and_then(|n| n.text()),
        Some("https://www.spid.gov.it/SpidL1")
    );
    Ok(())
}

#[test]
fn post_request_through_bundled_validators() -> anyhow::Result<()> {
    init_tracing();

    let body = HttpPostExtractor::encode_form(AUTHN_REQUEST);
    let request = Binding::HttpPost.extract(&QueryFields::parse(&body))?;
    assert_eq!(request.binding(), Binding::HttpPost);

    let limits = DocumentLimitsValidator::from_config(&IngestConfig::default());
    let tree = deserialize(&request, &[&limits, &XmlFormatValidator])?;
    assert_eq!(
        tree.child("nameidpolicy").and_then(|n| n.attribute("format")),
        Some("urn:oasis:names:tc:SAML:2.0:nameid-format:transient")
    );
    Ok(())
}

#[test]
fn malformed_document_stops_before_content_checks() {
    init_tracing();

    let body = HttpPostExtractor::encode_form("<samlp:AuthnRequest ID=\"_1\">");
    let request = Binding::HttpPost
        .extract(&QueryFields::parse(&body))
        .expect("extraction succeeds");

    let content_check = |request: &RawRequest| -> Result<(), ValidationError> {
        panic!("content check ran on {request:?}");
    };

    let err = deserialize(&request, &[&XmlFormatValidator, &content_check]).unwrap_err();
    match err {
        IngestError::Deserialization(aggregate) => {
            assert_eq!(aggregate.details.len(), 1);
            assert!(aggregate.details[0].contains("not well-formed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn content_failures_are_reported_together() {
    init_tracing();

    let request: RawRequest = PostRequest::new(AUTHN_REQUEST.to_string()).into();

    let version = |_: &RawRequest| -> Result<(), ValidationError> {
        Err(ValidationError::new(["Version must be 2.0"]))
    };
    let destination = |_: &RawRequest| -> Result<(), ValidationError> {
        Err(ValidationError::new([
            "Destination does not match",
            "IssueInstant is in the future",
        ]))
    };

    let err = deserialize(&request, &[&XmlFormatValidator, &version, &destination]).unwrap_err();
    assert_eq!(
        err.details(),
        vec![
            "Version must be 2.0",
            "Destination does not match",
            "IssueInstant is in the future",
        ]
    );
    assert_eq!(err.http_status(), 400);
}

#[test]
fn missing_signature_aborts_extraction() {
    let query = HttpRedirectExtractor::encode_query("<A/>", RSA_SHA256, b"sig")
        .expect("encoding succeeds");
    let stripped: String = query
        .split('&')
        .filter(|pair| !pair.starts_with("Signature="))
        .collect::<Vec<_>>()
        .join("&");

    let err = Binding::HttpRedirect
        .extract(&QueryFields::parse(&stripped))
        .unwrap_err();
    assert!(matches!(err, IngestError::MissingField { ref field } if field == "Signature"));
}
