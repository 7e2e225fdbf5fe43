//! Envelope codec: typed payloads to and from SOAP 1.1 documents.

use crate::envelope::{check_envelope, envelope_element, find_soap_child, BodyCall, Envelope, NoHeader};
use crate::error::{EncodeError, SchemaError};
use crate::fault::Fault;
use crate::schema::XmlSchema;
use crate::xml::{XmlElement, DEFAULT_MAX_DEPTH};
use tracing::debug;

/// Encode a payload as a complete SOAP envelope without header.
pub fn encode<T: XmlSchema>(payload: &T) -> Result<Vec<u8>, EncodeError> {
    encode_with_header::<NoHeader, T>(payload, None)
}

/// Encode a payload with an optional header.
pub fn encode_with_header<H: XmlSchema, T: XmlSchema>(
    payload: &T,
    header: Option<&H>,
) -> Result<Vec<u8>, EncodeError> {
    envelope_element(header, Some(payload.to_element())).to_xml(true)
}

/// Encode a fault envelope.
pub fn encode_fault(fault: &Fault) -> Result<Vec<u8>, EncodeError> {
    envelope_element::<NoHeader>(None, Some(fault.to_element())).to_xml(true)
}

/// Encode a full envelope.
pub fn encode_envelope<H: XmlSchema, T: XmlSchema>(
    envelope: &Envelope<H, T>,
) -> Result<Vec<u8>, EncodeError> {
    envelope.to_element().to_xml(true)
}

/// Decode the body payload of an envelope.
///
/// A Fault in the body is an error unless `T` is [`Fault`] itself. An empty
/// body only decodes when `T` accepts an element without content.
pub fn decode<T: XmlSchema>(data: &[u8]) -> Result<T, SchemaError> {
    let envelope = decode_envelope::<NoHeader, T>(data)?;
    payload_of(envelope.body.call)
}

/// Resolve the Body slot into the expected payload.
pub(crate) fn payload_of<T: XmlSchema>(call: Option<BodyCall<T>>) -> Result<T, SchemaError> {
    match call {
        Some(BodyCall::Content(payload)) => Ok(payload),
        Some(BodyCall::Fault(fault)) => Err(SchemaError::UnexpectedFault {
            expected: T::TAG.to_string(),
            code: fault.faultcode,
            detail: fault.faultstring,
        }),
        None => T::read_fields(&XmlElement::new(T::TAG)).map_err(|_| SchemaError::EmptyBody {
            expected: T::TAG.to_string(),
        }),
    }
}

/// Decode only the header slot.
pub fn decode_header<H: XmlSchema>(data: &[u8]) -> Result<Option<H>, SchemaError> {
    decode_header_with_depth(data, DEFAULT_MAX_DEPTH)
}

/// [`decode_header`] with an explicit element nesting limit.
pub fn decode_header_with_depth<H: XmlSchema>(
    data: &[u8],
    max_depth: usize,
) -> Result<Option<H>, SchemaError> {
    let root = XmlElement::parse_with_depth(data, max_depth)?;
    check_envelope(&root)?;
    debug!(header = H::TAG, "Parsing SOAP header");

    match find_soap_child(&root, "Header")? {
        Some(element) => H::read_fields(element).map(Some),
        None => Ok(None),
    }
}

/// Decode a full envelope, surfacing Fault bodies as [`BodyCall::Fault`].
pub fn decode_envelope<H: XmlSchema, T: XmlSchema>(
    data: &[u8],
) -> Result<Envelope<H, T>, SchemaError> {
    decode_envelope_with_depth(data, DEFAULT_MAX_DEPTH)
}

/// [`decode_envelope`] with an explicit element nesting limit.
pub fn decode_envelope_with_depth<H: XmlSchema, T: XmlSchema>(
    data: &[u8],
    max_depth: usize,
) -> Result<Envelope<H, T>, SchemaError> {
    let root = XmlElement::parse_with_depth(data, max_depth)?;
    debug!(payload = T::TAG, size = data.len(), max_depth, "Parsing SOAP envelope");
    Envelope::from_element(&root)
}
