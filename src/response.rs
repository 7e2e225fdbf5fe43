//! SOAP responses and fault rendering.

use crate::codec;
use crate::envelope::NoHeader;
use crate::error::SoapError;
use crate::fault::Fault;
use crate::schema::XmlSchema;
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

/// Media type of every SOAP 1.1 message and WSDL document.
pub const SOAP_CONTENT_TYPE: &str = "text/xml";

/// Sent when even the fault envelope cannot be encoded.
const FALLBACK_FAULT: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
    r#"<soap:Body><Fault><faultcode>server</faultcode>"#,
    r#"<faultstring>Internal Error: fault encoding failed</faultstring></Fault></soap:Body>"#,
    r#"</soap:Envelope>"#
);

/// Successful operation result, wrapped in an envelope on the way out.
///
/// ```ignore
/// async fn sum(XmlBody(body): XmlBody<Operands>) -> SoapResult<Total> {
///     Ok(SoapResponse::new(Total { value: body.operands.iter().sum() }))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SoapResponse<T, H = NoHeader> {
    payload: T,
    header: Option<H>,
    status: StatusCode,
}

/// Return type for operation handlers.
pub type SoapResult<T, H = NoHeader> = Result<SoapResponse<T, H>, SoapError>;

impl<T: XmlSchema> SoapResponse<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            header: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: XmlSchema, H: XmlSchema> SoapResponse<T, H> {
    /// Attach a `soap:Header`.
    pub fn with_header<H2: XmlSchema>(self, header: H2) -> SoapResponse<T, H2> {
        SoapResponse {
            payload: self.payload,
            header: Some(header),
            status: self.status,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: XmlSchema, H: XmlSchema> IntoResponse for SoapResponse<T, H> {
    fn into_response(self) -> Response {
        match codec::encode_with_header(&self.payload, self.header.as_ref()) {
            Ok(body) => xml_response(self.status, body),
            Err(err) => SoapError::internal(err).into_response(),
        }
    }
}

impl IntoResponse for SoapError {
    fn into_response(self) -> Response {
        let (fault, status) = self.to_fault();
        match &self {
            Self::Internal(_) => error!(
                code = %fault.faultcode,
                detail = %fault.faultstring,
                status = status.as_u16(),
                "SOAP operation failed"
            ),
            _ => warn!(
                code = %fault.faultcode,
                detail = %fault.faultstring,
                status = status.as_u16(),
                "Returning SOAP fault"
            ),
        }
        fault_response(&fault, status)
    }
}

/// Render a fault envelope.
pub fn fault_response(fault: &Fault, status: StatusCode) -> Response {
    match codec::encode_fault(fault) {
        Ok(body) => xml_response(status, body),
        Err(err) => {
            error!(error = %err, "Failed to encode SOAP fault");
            xml_response(StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_FAULT)
        }
    }
}

pub(crate) fn xml_response(status: StatusCode, body: impl Into<Body>) -> Response {
    (status, [(header::CONTENT_TYPE, SOAP_CONTENT_TYPE)], body.into()).into_response()
}
