//! Request extractors that decode SOAP envelopes into typed values.
//!
//! Each extractor consumes the request body, so a handler takes exactly one
//! of them. Use [`XmlEnvelope`] when both header and payload are needed.

use crate::codec;
use crate::config::ValidationFaultPolicy;
use crate::envelope::NoHeader;
use crate::error::{SchemaError, SoapError};
use crate::schema::XmlSchema;
use crate::xml::DEFAULT_MAX_DEPTH;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use std::ops::Deref;

/// Body payload of the inbound envelope.
#[derive(Debug, Clone)]
pub struct XmlBody<T>(pub T);

/// Header of the inbound envelope, `None` when absent.
#[derive(Debug, Clone)]
pub struct XmlHeader<H>(pub Option<H>);

/// Header and payload from a single parse.
#[derive(Debug, Clone)]
pub struct XmlEnvelope<H, T> {
    pub header: Option<H>,
    pub body: T,
}

impl<T> Deref for XmlBody<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Element nesting limit for inbound envelopes, set by the service router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DepthLimit(pub(crate) usize);

struct RawEnvelope {
    bytes: Bytes,
    policy: ValidationFaultPolicy,
    max_depth: usize,
}

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<RawEnvelope, SoapError> {
    let policy = req
        .extensions()
        .get::<ValidationFaultPolicy>()
        .copied()
        .unwrap_or_default();
    let max_depth = req
        .extensions()
        .get::<DepthLimit>()
        .map_or(DEFAULT_MAX_DEPTH, |limit| limit.0);

    let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
        SoapError::client(rejection.body_text()).with_status(rejection.status())
    })?;

    Ok(RawEnvelope {
        bytes,
        policy,
        max_depth,
    })
}

/// Turn a schema failure into the rejection the policy asks for.
fn reject(err: SchemaError, policy: ValidationFaultPolicy) -> SoapError {
    match policy {
        ValidationFaultPolicy::Raise => SoapError::Validation(err),
        ValidationFaultPolicy::Inline => {
            SoapError::client(err.to_string()).with_status(StatusCode::OK)
        }
    }
}

impl<T, S> FromRequest<S> for XmlBody<T>
where
    T: XmlSchema + Send,
    S: Send + Sync,
{
    type Rejection = SoapError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = read_body(req, state).await?;
        codec::decode_envelope_with_depth::<NoHeader, T>(&raw.bytes, raw.max_depth)
            .and_then(|envelope| codec::payload_of::<T>(envelope.body.call))
            .map(XmlBody)
            .map_err(|err| reject(err, raw.policy))
    }
}

impl<H, S> FromRequest<S> for XmlHeader<H>
where
    H: XmlSchema + Send,
    S: Send + Sync,
{
    type Rejection = SoapError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = read_body(req, state).await?;
        codec::decode_header_with_depth::<H>(&raw.bytes, raw.max_depth)
            .map(XmlHeader)
            .map_err(|err| reject(err, raw.policy))
    }
}

impl<H, T, S> FromRequest<S> for XmlEnvelope<H, T>
where
    H: XmlSchema + Send,
    T: XmlSchema + Send,
    S: Send + Sync,
{
    type Rejection = SoapError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = read_body(req, state).await?;
        let envelope = codec::decode_envelope_with_depth::<H, T>(&raw.bytes, raw.max_depth)
            .map_err(|err| reject(err, raw.policy))?;
        let body =
            codec::payload_of::<T>(envelope.body.call).map_err(|err| reject(err, raw.policy))?;
        Ok(Self {
            header: envelope.header,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct Operands => "Operands" {
            operands: Vec<f64> => element("Operand"),
        }
    }

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct ApiKey => "Header" {
            key: String => element("XApiKey"),
        }
    }

    const VALID: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
        <soap:Header><XApiKey>secret</XApiKey></soap:Header>
        <soap:Body><Operands><Operand>2</Operand><Operand>3</Operand></Operands></soap:Body>
    </soap:Envelope>"#;

    const INVALID: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
        <soap:Body><Operands><Operand>abc</Operand></Operands></soap:Body>
    </soap:Envelope>"#;

    fn request(body: &'static str, policy: Option<ValidationFaultPolicy>) -> Request {
        let mut req = axum::http::Request::builder()
            .method("POST")
            .uri("/Calculator/Sum")
            .body(Body::from(body))
            .unwrap();
        if let Some(policy) = policy {
            req.extensions_mut().insert(policy);
        }
        req
    }

    #[tokio::test]
    async fn test_body_extractor() {
        let XmlBody(operands) = XmlBody::<Operands>::from_request(request(VALID, None), &())
            .await
            .unwrap();
        assert_eq!(operands.operands, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_header_extractor() {
        let XmlHeader(header) = XmlHeader::<ApiKey>::from_request(request(VALID, None), &())
            .await
            .unwrap();
        assert_eq!(header.unwrap().key, "secret");

        let XmlHeader(header) = XmlHeader::<ApiKey>::from_request(request(INVALID, None), &())
            .await
            .unwrap();
        assert!(header.is_none());
    }

    #[tokio::test]
    async fn test_envelope_extractor() {
        let envelope = XmlEnvelope::<ApiKey, Operands>::from_request(request(VALID, None), &())
            .await
            .unwrap();
        assert_eq!(envelope.header.unwrap().key, "secret");
        assert_eq!(envelope.body.operands.len(), 2);
    }

    #[tokio::test]
    async fn test_raise_policy_rejects_with_validation_error() {
        let err = XmlBody::<Operands>::from_request(request(INVALID, None), &())
            .await
            .unwrap_err();
        assert!(matches!(err, SoapError::Validation(SchemaError::InvalidValue { .. })));

        let (fault, status) = err.to_fault();
        assert_eq!(fault.faultcode, "client");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_inline_policy_answers_with_ok() {
        let err = XmlBody::<Operands>::from_request(
            request(INVALID, Some(ValidationFaultPolicy::Inline)),
            &(),
        )
        .await
        .unwrap_err();

        let (fault, status) = err.to_fault();
        assert_eq!(fault.faultcode, "client");
        assert_eq!(fault.faultstring, "Invalid double value 'abc' for 'Operand'");
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_depth_limit_from_extension() {
        let mut req = request(VALID, None);
        req.extensions_mut().insert(DepthLimit(3));
        let err = XmlBody::<Operands>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, SoapError::Validation(SchemaError::Malformed(ref m)) if m.contains("depth")));

        let mut req = request(VALID, None);
        req.extensions_mut().insert(DepthLimit(4));
        assert!(XmlBody::<Operands>::from_request(req, &()).await.is_ok());
    }
}
