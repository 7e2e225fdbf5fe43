//! SOAP Fault model and the fault mapper.

use crate::error::SoapError;
use axum::http::StatusCode;

/// Fault code for caller-side problems (bad envelope, bad payload).
pub const CLIENT: &str = "client";

/// Fault code for service-side problems.
pub const SERVER: &str = "server";

const GENERIC_DETAIL: &str = "Unspecified error";

crate::soap_schema! {
    /// SOAP 1.1 Fault body content.
    ///
    /// ```xml
    /// <Fault>
    ///     <faultcode>server</faultcode>
    ///     <faultstring>insufficient funds</faultstring>
    /// </Fault>
    /// ```
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Fault => "Fault" {
        pub faultcode: String,
        pub faultstring: String,
    }
}

impl Fault {
    /// Build a fault, substituting defaults for empty code or detail.
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        let code = code.into();
        let detail = detail.into();
        Self {
            faultcode: if code.trim().is_empty() {
                SERVER.to_string()
            } else {
                code
            },
            faultstring: if detail.trim().is_empty() {
                GENERIC_DETAIL.to_string()
            } else {
                detail
            },
        }
    }

    pub fn client(detail: impl Into<String>) -> Self {
        Self::new(CLIENT, detail)
    }

    pub fn server(detail: impl Into<String>) -> Self {
        Self::new(SERVER, detail)
    }

    pub fn is_client(&self) -> bool {
        self.faultcode.eq_ignore_ascii_case(CLIENT)
    }
}

impl SoapError {
    /// Map this error onto the fault it renders as, plus the HTTP status.
    pub fn to_fault(&self) -> (Fault, StatusCode) {
        match self {
            Self::Validation(err) => (Fault::client(err.to_string()), StatusCode::INTERNAL_SERVER_ERROR),
            Self::Fault {
                code,
                detail,
                status,
            } => (Fault::new(code.as_str(), detail.as_str()), *status),
            Self::Internal(message) => (
                Fault::server(format!("Internal Error: {}", message)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }
}
