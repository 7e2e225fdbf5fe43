//! Error types for the SOAP service.

use axum::http::StatusCode;
use thiserror::Error;

/// Shape failures raised while decoding an inbound envelope.
///
/// Every variant renders a human-readable detail that ends up as the
/// `faultstring` of a client fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Expected <{expected}> element, found <{found}>")]
    UnexpectedElement { expected: String, found: String },

    #[error("Element <{element}> has namespace {found:?}, expected {expected:?}")]
    Namespace {
        element: String,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("SOAP Body is empty, expected <{expected}>")]
    EmptyBody { expected: String },

    #[error("Missing required element <{tag}> in <{parent}>")]
    MissingElement { parent: String, tag: String },

    #[error("Missing required attribute '{name}' on <{parent}>")]
    MissingAttribute { parent: String, name: String },

    #[error("Element <{tag}> occurs {found} time(s) in <{parent}>, expected {expected}")]
    Cardinality {
        parent: String,
        tag: String,
        found: usize,
        expected: String,
    },

    #[error("Invalid {expected} value '{value}' for '{tag}'")]
    InvalidValue {
        tag: String,
        value: String,
        expected: String,
    },

    #[error("Expected <{expected}> but SOAP Body carries a Fault ({code}: {detail})")]
    UnexpectedFault {
        expected: String,
        code: String,
        detail: String,
    },
}

/// Failures while serializing an element tree.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoded document is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors surfaced by SOAP operations.
///
/// This is the narrow set of fault signals the route boundary understands;
/// see [`SoapError::to_fault`](crate::fault) for how each one is rendered.
#[derive(Error, Debug)]
pub enum SoapError {
    /// The inbound envelope did not match the expected schema.
    #[error("{0}")]
    Validation(#[from] SchemaError),

    /// Explicit fault raised by an operation.
    #[error("{detail}")]
    Fault {
        code: String,
        detail: String,
        status: StatusCode,
    },

    /// Any other failure escaping an operation.
    #[error("Internal Error: {0}")]
    Internal(String),
}

impl SoapError {
    /// Server fault with the given detail (`faultcode` "server", HTTP 500).
    pub fn fault(detail: impl Into<String>) -> Self {
        Self::Fault {
            code: crate::fault::SERVER.to_string(),
            detail: detail.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client fault with the given detail (`faultcode` "client", HTTP 500).
    pub fn client(detail: impl Into<String>) -> Self {
        Self::Fault {
            code: crate::fault::CLIENT.to_string(),
            detail: detail.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap an arbitrary error as an internal fault.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    /// Override the fault code. Internal and validation errors are turned
    /// into explicit faults first.
    pub fn with_code(self, code: impl Into<String>) -> Self {
        match self.into_explicit() {
            Self::Fault { detail, status, .. } => Self::Fault {
                code: code.into(),
                detail,
                status,
            },
            other => other,
        }
    }

    /// Override the HTTP status used for the fault response.
    pub fn with_status(self, status: StatusCode) -> Self {
        match self.into_explicit() {
            Self::Fault { code, detail, .. } => Self::Fault {
                code,
                detail,
                status,
            },
            other => other,
        }
    }

    fn into_explicit(self) -> Self {
        match self {
            Self::Fault { .. } => self,
            other => {
                let (fault, status) = other.to_fault();
                Self::Fault {
                    code: fault.faultcode,
                    detail: fault.faultstring,
                    status,
                }
            }
        }
    }
}

impl From<anyhow::Error> for SoapError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
