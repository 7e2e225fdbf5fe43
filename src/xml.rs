//! Owned XML element tree.
//!
//! Parsing uses quick-xml's namespace-aware reader, which never expands
//! external entities; DOCTYPE declarations are rejected outright. Element
//! nesting is bounded by a depth limit checked while reading.

use crate::error::{EncodeError, SchemaError};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};
use std::borrow::Cow;

/// Nesting depth accepted by [`XmlElement::parse`], counting the root as 1.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with resolved namespace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Prefix used when writing (`soap` in `soap:Body`)
    pub prefix: Option<String>,
    /// Local name
    pub name: String,
    /// Resolved namespace URI (parsed documents only)
    pub namespace: Option<String>,
    /// Attributes in document order, keys as written (`xmlns:soap`, `name`)
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element from a possibly prefixed name.
    pub fn new(qualified_name: &str) -> Self {
        let (prefix, name) = match qualified_name.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, qualified_name.to_string()),
        };
        Self {
            prefix,
            name,
            ..Default::default()
        }
    }

    /// Create an element holding a single text node.
    pub fn with_text(qualified_name: &str, text: impl Into<String>) -> Self {
        let mut element = Self::new(qualified_name);
        element.push_text(text);
        element
    }

    /// Builder-style attribute setter.
    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder-style child append.
    pub fn child(mut self, child: XmlElement) -> Self {
        self.push(child);
        self
    }

    /// Set an attribute, replacing an existing one with the same key.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Look up an attribute by local name, ignoring namespace declarations.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .filter(|(key, _)| key != "xmlns" && !key.starts_with("xmlns:"))
            .find(|(key, _)| key == name || key.rsplit(':').next() == Some(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Child elements with the given local name.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.name == name)
    }

    /// First child element with the given local name.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Name as written, including prefix.
    pub fn qualified_name(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, self.name)),
            None => Cow::Borrowed(&self.name),
        }
    }

    /// Parse a document and return its root element.
    pub fn parse(data: &[u8]) -> Result<Self, SchemaError> {
        Self::parse_with_depth(data, DEFAULT_MAX_DEPTH)
    }

    /// Parse a document, rejecting elements nested deeper than `max_depth`.
    ///
    /// Text is kept verbatim. Whitespace-only text between child elements is
    /// layout and gets dropped.
    pub fn parse_with_depth(data: &[u8], max_depth: usize) -> Result<Self, SchemaError> {
        let xml_str = std::str::from_utf8(data)
            .map_err(|e| SchemaError::Malformed(format!("Invalid UTF-8: {}", e)))?;

        let mut reader = NsReader::from_str(xml_str);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_resolved_event() {
                Ok((ns, Event::Start(ref e))) => {
                    check_depth(stack.len() + 1, max_depth)?;
                    let namespace = resolved_namespace(ns)?;
                    stack.push(element_from_start(e, namespace)?);
                }

                Ok((ns, Event::Empty(ref e))) => {
                    check_depth(stack.len() + 1, max_depth)?;
                    let namespace = resolved_namespace(ns)?;
                    let element = element_from_start(e, namespace)?;
                    attach(&mut stack, &mut root, element)?;
                }

                Ok((_, Event::End(_))) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        SchemaError::Malformed("Unbalanced closing tag".to_string())
                    })?;
                    drop_layout_whitespace(&mut element);
                    attach(&mut stack, &mut root, element)?;
                }

                Ok((_, Event::Text(ref e))) => {
                    let text = e
                        .unescape()
                        .map_err(|e| SchemaError::Malformed(e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.push_text(text.into_owned());
                    }
                }

                Ok((_, Event::CData(ref e))) => {
                    let text = std::str::from_utf8(e)
                        .map_err(|e| SchemaError::Malformed(format!("Invalid UTF-8: {}", e)))?;
                    if let Some(current) = stack.last_mut() {
                        current.push_text(text.to_string());
                    }
                }

                Ok((_, Event::DocType(_))) => {
                    return Err(SchemaError::Malformed(
                        "DOCTYPE declarations are not allowed".to_string(),
                    ));
                }

                Ok((_, Event::Eof)) => break,

                Err(e) => {
                    return Err(SchemaError::Malformed(format!("XML parse error: {}", e)));
                }

                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(SchemaError::Malformed(
                "Unexpected end of document".to_string(),
            ));
        }

        root.ok_or_else(|| SchemaError::Malformed("Document has no root element".to_string()))
    }

    /// Serialize to bytes, optionally with a UTF-8 XML declaration.
    pub fn to_xml(&self, declaration: bool) -> Result<Vec<u8>, EncodeError> {
        let mut writer = Writer::new(Vec::new());
        if declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        write_element(&mut writer, self)?;
        Ok(writer.into_inner())
    }

    /// Serialize to a string, optionally with a UTF-8 XML declaration.
    pub fn to_xml_string(&self, declaration: bool) -> Result<String, EncodeError> {
        Ok(String::from_utf8(self.to_xml(declaration)?)?)
    }
}

fn check_depth(depth: usize, max_depth: usize) -> Result<(), SchemaError> {
    if depth > max_depth {
        return Err(SchemaError::Malformed(format!(
            "XML nesting depth exceeded (max {})",
            max_depth
        )));
    }
    Ok(())
}

/// Remove indentation between child elements; text-only content is untouched.
fn drop_layout_whitespace(element: &mut XmlElement) {
    let has_elements = element
        .children
        .iter()
        .any(|node| matches!(node, XmlNode::Element(_)));
    if has_elements {
        element.children.retain(|node| match node {
            XmlNode::Text(text) => !text.trim().is_empty(),
            XmlNode::Element(_) => true,
        });
    }
}

fn resolved_namespace(ns: ResolveResult) -> Result<Option<String>, SchemaError> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(String::from_utf8_lossy(uri).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(SchemaError::Malformed(format!(
            "Unknown namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn element_from_start(e: &BytesStart, namespace: Option<String>) -> Result<XmlElement, SchemaError> {
    let name = e.name();
    let prefix = name
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| SchemaError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SchemaError::Malformed(e.to_string()))?;
        attributes.push((key, value.into_owned()));
    }

    Ok(XmlElement {
        prefix,
        name: local,
        namespace,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), SchemaError> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(SchemaError::Malformed(
                "Multiple root elements".to_string(),
            ))
        }
    }
    Ok(())
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> Result<(), EncodeError> {
    let name = element.qualified_name();
    let mut start = BytesStart::new(name.as_ref());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_ref())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header>
    <m:Trans xmlns:m="http://example.org/trans" m:mustUnderstand="1">234</m:Trans>
  </soap:Header>
  <soap:Body>
    <GetPrice>
      <Item>Apples &amp; Pears</Item>
      <Note><![CDATA[<raw>]]></Note>
    </GetPrice>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn test_parse_resolves_namespaces() {
        let root = XmlElement::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(root.name, "Envelope");
        assert_eq!(root.prefix.as_deref(), Some("soap"));
        assert_eq!(
            root.namespace.as_deref(),
            Some("http://schemas.xmlsoap.org/soap/envelope/")
        );

        let header = root.find("Header").unwrap();
        let trans = header.find("Trans").unwrap();
        assert_eq!(trans.namespace.as_deref(), Some("http://example.org/trans"));
        assert_eq!(trans.attribute("mustUnderstand"), Some("1"));
        assert_eq!(trans.text(), "234");

        let call = root.find("Body").unwrap().elements().next().unwrap();
        assert_eq!(call.name, "GetPrice");
        assert_eq!(call.namespace, None);
        assert_eq!(call.find("Item").unwrap().text(), "Apples & Pears");
        assert_eq!(call.find("Note").unwrap().text(), "<raw>");
    }

    #[test]
    fn test_doctype_rejected() {
        let xxe_payload = r#"<?xml version="1.0"?>
<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>&xxe;</soap:Body>
</soap:Envelope>"#;

        let err = XmlElement::parse(xxe_payload.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(ref m) if m.contains("DOCTYPE")));
    }

    #[test]
    fn test_unbalanced_document() {
        assert!(XmlElement::parse(b"<a><b></a>").is_err());
        assert!(XmlElement::parse(b"<a><b>").is_err());
        assert!(XmlElement::parse(b"").is_err());
    }

    #[test]
    fn test_unknown_prefix() {
        let err = XmlElement::parse(b"<x:Envelope/>").unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[test]
    fn test_write_escapes_and_empty_elements() {
        let element = XmlElement::new("soap:Body")
            .attr("xmlns:soap", "http://schemas.xmlsoap.org/soap/envelope/")
            .child(XmlElement::with_text("Item", "a < b & c"))
            .child(XmlElement::new("Empty").attr("note", "\"quoted\""));

        let xml = element.to_xml_string(false).unwrap();
        assert!(xml.starts_with("<soap:Body xmlns:soap="));
        assert!(xml.contains("<Item>a &lt; b &amp; c</Item>"));
        assert!(xml.contains("<Empty note=\"&quot;quoted&quot;\"/>"));
    }

    #[test]
    fn test_declaration() {
        let xml = XmlElement::new("Root").to_xml_string(true).unwrap();
        assert_eq!(xml, r#"<?xml version="1.0" encoding="UTF-8"?><Root/>"#);
    }

    #[test]
    fn test_attribute_lookup_skips_namespace_declarations() {
        let element = XmlElement::new("a")
            .attr("xmlns:name", "urn:x")
            .attr("name", "value");
        assert_eq!(element.attribute("name"), Some("value"));
        assert_eq!(XmlElement::new("a").attr("xmlns:name", "urn:x").attribute("name"), None);
    }

    #[test]
    fn test_text_kept_verbatim() {
        let root = XmlElement::parse(b"<Note>  padded value  </Note>").unwrap();
        assert_eq!(root.text(), "  padded value  ");

        let root = XmlElement::parse(b"<Note> </Note>").unwrap();
        assert_eq!(root.text(), " ");
    }

    #[test]
    fn test_layout_whitespace_between_elements_dropped() {
        let root = XmlElement::parse(b"<a>\n  <b> x </b>\n  <c/>\n</a>").unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.text(), "");
        assert_eq!(root.find("b").unwrap().text(), " x ");
    }

    #[test]
    fn test_depth_limit() {
        let nested = |depth: usize| {
            let mut xml = String::new();
            for _ in 0..depth {
                xml.push_str("<x>");
            }
            for _ in 0..depth {
                xml.push_str("</x>");
            }
            xml
        };

        assert!(XmlElement::parse_with_depth(nested(5).as_bytes(), 5).is_ok());
        let err = XmlElement::parse_with_depth(nested(6).as_bytes(), 5).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(ref m) if m.contains("depth")));

        let err = XmlElement::parse_with_depth(b"<a><b><c/></b></a>", 2).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[test]
    fn test_deep_document_rejected_by_default() {
        let mut xml = String::from("<Envelope><Body><Operands>");
        for _ in 0..100_000 {
            xml.push_str("<x>");
        }
        for _ in 0..100_000 {
            xml.push_str("</x>");
        }
        xml.push_str("</Operands></Body></Envelope>");

        let err = XmlElement::parse(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(ref m) if m.contains("depth")));
    }
}
