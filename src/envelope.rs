//! SOAP 1.1 envelope, header and body wrappers.

use crate::error::SchemaError;
use crate::fault::Fault;
use crate::schema::XmlSchema;
use crate::xml::XmlElement;

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Prefix used for envelope elements on output.
pub const SOAP_ENV_PREFIX: &str = "soap";

crate::soap_schema! {
    /// Header type for envelopes that carry no header fields.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct NoHeader => "Header" {}
}

crate::soap_schema! {
    /// Body content for operations without input or output fields.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Empty => "Empty" {}
}

/// What occupies the Body slot.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyCall<T> {
    Content(T),
    Fault(Fault),
}

/// `soap:Body` holding at most one payload or fault.
#[derive(Debug, Clone, PartialEq)]
pub struct Body<T> {
    pub call: Option<BodyCall<T>>,
}

impl<T> Body<T> {
    pub fn content(payload: T) -> Self {
        Self {
            call: Some(BodyCall::Content(payload)),
        }
    }

    pub fn fault(fault: Fault) -> Self {
        Self {
            call: Some(BodyCall::Fault(fault)),
        }
    }

    pub fn empty() -> Self {
        Self { call: None }
    }
}

/// `soap:Envelope` with an optional header and exactly one body.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<H, T> {
    pub header: Option<H>,
    pub body: Body<T>,
}

impl<H: XmlSchema, T: XmlSchema> Envelope<H, T> {
    pub fn new(header: Option<H>, body: Body<T>) -> Self {
        Self { header, body }
    }

    /// Build the `soap:Envelope` element tree.
    pub fn to_element(&self) -> XmlElement {
        let call = match &self.body.call {
            Some(BodyCall::Content(payload)) => Some(payload.to_element()),
            Some(BodyCall::Fault(fault)) => Some(fault.to_element()),
            None => None,
        };
        envelope_element(self.header.as_ref(), call)
    }

    /// Read an envelope from a parsed document root.
    pub fn from_element(root: &XmlElement) -> Result<Self, SchemaError> {
        check_envelope(root)?;

        let header = match find_soap_child(root, "Header")? {
            Some(element) => Some(H::read_fields(element)?),
            None => None,
        };

        let body = find_soap_child(root, "Body")?.ok_or(SchemaError::MissingBody)?;
        let mut calls = body.elements();
        let first = calls.next();
        let extra = calls.count();
        if extra > 0 {
            return Err(SchemaError::Cardinality {
                parent: "Body".to_string(),
                tag: first.map(|element| element.name.clone()).unwrap_or_default(),
                found: extra + 1,
                expected: "at most 1".to_string(),
            });
        }

        let call = match first {
            None => None,
            Some(element) if element.name == Fault::TAG && T::TAG != Fault::TAG => {
                Some(BodyCall::Fault(Fault::from_element(element)?))
            }
            Some(element) => Some(BodyCall::Content(T::from_element(element)?)),
        };

        Ok(Self {
            header,
            body: Body { call },
        })
    }
}

/// Wrap an already built body element (and optional header) in an envelope.
pub(crate) fn envelope_element<H: XmlSchema>(header: Option<&H>, call: Option<XmlElement>) -> XmlElement {
    let mut envelope =
        soap_element("Envelope").attr(&format!("xmlns:{}", SOAP_ENV_PREFIX), SOAP_ENV_NS);

    if let Some(header) = header {
        let mut element = soap_element("Header");
        header.write_fields(&mut element);
        envelope.push(element);
    }

    let mut body = soap_element("Body");
    if let Some(call) = call {
        body.push(call);
    }
    envelope.push(body);
    envelope
}

fn soap_element(name: &str) -> XmlElement {
    XmlElement::new(&format!("{}:{}", SOAP_ENV_PREFIX, name))
}

fn is_soap_namespace(element: &XmlElement) -> bool {
    matches!(element.namespace.as_deref(), None | Some(SOAP_ENV_NS))
}

/// Check the root element is a SOAP 1.1 `Envelope`.
pub(crate) fn check_envelope(root: &XmlElement) -> Result<(), SchemaError> {
    if root.name != "Envelope" {
        return Err(SchemaError::UnexpectedElement {
            expected: "Envelope".to_string(),
            found: root.qualified_name().into_owned(),
        });
    }
    if !is_soap_namespace(root) {
        return Err(SchemaError::Namespace {
            element: "Envelope".to_string(),
            expected: Some(SOAP_ENV_NS.to_string()),
            found: root.namespace.clone(),
        });
    }
    Ok(())
}

/// Find a direct `Header` or `Body` child, rejecting foreign namespaces.
pub(crate) fn find_soap_child<'a>(
    root: &'a XmlElement,
    name: &str,
) -> Result<Option<&'a XmlElement>, SchemaError> {
    match root.find(name) {
        Some(element) if !is_soap_namespace(element) => Err(SchemaError::Namespace {
            element: name.to_string(),
            expected: Some(SOAP_ENV_NS.to_string()),
            found: element.namespace.clone(),
        }),
        found => Ok(found),
    }
}
