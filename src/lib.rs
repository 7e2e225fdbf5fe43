//! SOAP 1.1 services on axum
//!
//! Declares typed payloads, decodes and encodes SOAP envelopes, turns every
//! failure into a SOAP Fault and publishes a WSDL description generated from
//! the same schema types.
//!
//! # Features
//!
//! - Schema types via [`soap_schema!`] (element, text and attribute bindings)
//! - Envelope codec with optional headers and Fault bodies
//! - Fault mapping for validation, application and internal errors
//! - Operation registry and WSDL/XSD reflection
//! - axum extractors, responses and a panic-safe route boundary
//!
//! # Example
//!
//! ```ignore
//! use soap_service::{soap_schema, OperationRecord, ServiceConfig, SoapResponse, SoapResult, SoapService, XmlBody};
//!
//! soap_schema! {
//!     #[derive(Debug, Clone)]
//!     pub struct Operands => "Operands" {
//!         pub operands: Vec<f64> => element("Operand"),
//!     }
//! }
//!
//! soap_schema! {
//!     #[derive(Debug, Clone)]
//!     pub struct Total => "Result" {
//!         pub value: f64 => text(),
//!     }
//! }
//!
//! async fn sum(XmlBody(body): XmlBody<Operands>) -> SoapResult<Total> {
//!     Ok(SoapResponse::new(Total { value: body.operands.iter().sum() }))
//! }
//!
//! let app = SoapService::new(ServiceConfig::new("Calculator", "/Calculator"))
//!     .operation(OperationRecord::new("Sum").request::<Operands>().response::<Total>(), sum)
//!     .into_router();
//! ```

pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod fault;
pub mod registry;
pub mod response;
pub mod schema;
pub mod service;
pub mod wsdl;
pub mod xml;

pub use codec::{decode, decode_envelope, decode_header, encode, encode_with_header};
pub use config::{AppConfig, ServerConfig, ServiceConfig, ValidationFaultPolicy};
pub use envelope::{Body, BodyCall, Empty, Envelope, NoHeader};
pub use error::{EncodeError, SchemaError, SoapError};
pub use extract::{XmlBody, XmlEnvelope, XmlHeader};
pub use fault::Fault;
pub use registry::{OperationRecord, OperationRegistry, ServiceDescriptor};
pub use response::{SoapResponse, SoapResult};
pub use schema::{XmlScalar, XmlSchema};
pub use service::SoapService;
