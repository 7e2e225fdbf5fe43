//! WSDL 1.1 and XSD generation from the operation registry.
//!
//! The document layout is fixed: documentation, types, messages, portType,
//! bindings, then service. Every operation gets its own binding and port,
//! addressed at `{base_url}/{Operation}`.

use crate::error::EncodeError;
use crate::registry::{OperationRecord, ServiceDescriptor};
use crate::schema::{Cardinality, FieldBinding, FieldDescriptor, FieldKind, SchemaDescriptor, SchemaRef};
use crate::xml::XmlElement;
use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// WSDL SOAP binding namespace.
pub const WSDL_SOAP_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";

/// WSDL 1.1 namespace.
pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";

/// XML Schema namespace.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// SOAP over HTTP transport URI.
pub const SOAP_HTTP_TRANSPORT: &str = "http://schemas.xmlsoap.org/soap/http";

/// Build the WSDL document for a service.
pub fn generate(service: &ServiceDescriptor, base_url: &str) -> XmlElement {
    debug!(
        service = %service.name,
        operations = service.operations.len(),
        base_url = base_url,
        "Generating WSDL"
    );

    let base_url = base_url.trim_end_matches('/');
    let name = service.name.as_str();

    let mut definitions = XmlElement::new("wsdl:definitions")
        .attr("xmlns:soap", WSDL_SOAP_NS)
        .attr("xmlns:wsdl", WSDL_NS)
        .attr("xmlns:xs", XSD_NS)
        .attr("xmlns:wsdlsoap", WSDL_SOAP_NS)
        .attr("name", name);

    definitions.push(if service.documentation.is_empty() {
        XmlElement::new("wsdl:documentation")
    } else {
        XmlElement::with_text("wsdl:documentation", service.documentation.as_str())
    });

    let mut types = TypesBuilder::default();
    let mut messages = Vec::new();
    let mut port_type = XmlElement::new("wsdl:portType").attr("name", name);
    let mut bindings = Vec::new();
    let mut ports = XmlElement::new("wsdl:service").attr("name", name);

    for operation in &service.operations {
        let operation_name = format!("{}{}", name, operation.name);

        let mut port_operation = XmlElement::new("wsdl:operation").attr("name", &operation_name);
        let mut binding_operation = XmlElement::new("wsdl:operation")
            .attr("name", &operation_name)
            .child(XmlElement::new("soap:operation").attr("soapAction", &operation.name));

        for (direction, message_name, descriptor) in messages_of(operation) {
            types.add_root(descriptor);

            messages.push(
                XmlElement::new("wsdl:message").attr("name", &message_name).child(
                    XmlElement::new("wsdl:part")
                        .attr("name", "parameters")
                        .attr("element", descriptor.tag),
                ),
            );

            let qualified = format!("wsdl:{}", direction);
            port_operation.push(XmlElement::new(&qualified).attr("message", &message_name));
            binding_operation.push(
                XmlElement::new(&qualified)
                    .attr("message", &message_name)
                    .child(XmlElement::new("soap:body").attr("use", "literal")),
            );
        }

        port_type.push(port_operation);

        bindings.push(
            XmlElement::new("wsdl:binding")
                .attr("name", &operation_name)
                .attr("type", name)
                .child(
                    XmlElement::new("soap:binding")
                        .attr("style", "document")
                        .attr("transport", SOAP_HTTP_TRANSPORT),
                )
                .child(binding_operation),
        );

        ports.push(
            XmlElement::new("wsdl:port")
                .attr("name", &operation_name)
                .attr("binding", &operation_name)
                .child(
                    XmlElement::new("soap:address")
                        .attr("location", format!("{}/{}", base_url, operation.name)),
                ),
        );
    }

    definitions.push(XmlElement::new("wsdl:types").child(types.finish()));
    for message in messages {
        definitions.push(message);
    }
    definitions.push(port_type);
    for binding in bindings {
        definitions.push(binding);
    }
    definitions.push(ports);
    definitions
}

/// Render the WSDL document with an XML declaration.
pub fn to_xml_string(service: &ServiceDescriptor, base_url: &str) -> Result<String, EncodeError> {
    generate(service, base_url).to_xml_string(true)
}

fn messages_of(
    operation: &OperationRecord,
) -> impl Iterator<Item = (&'static str, String, &SchemaDescriptor)> {
    let request = operation
        .request
        .as_ref()
        .map(|d| ("input", format!("{}Request", operation.name), d));
    let response = operation
        .response
        .as_ref()
        .map(|d| ("output", format!("{}Response", operation.name), d));
    request.into_iter().chain(response)
}

/// Collects top-level elements and named complex types, one per schema type.
#[derive(Default)]
struct TypesBuilder {
    names: HashMap<TypeId, String>,
    taken: HashSet<String>,
    roots: HashMap<&'static str, TypeId>,
    elements: Vec<XmlElement>,
    pending: VecDeque<SchemaDescriptor>,
}

impl TypesBuilder {
    /// Declare the top-level element for a message payload. Element names are
    /// unique; a second type claiming an existing tag keeps only its type.
    fn add_root(&mut self, descriptor: &SchemaDescriptor) {
        let type_name = self.type_name(descriptor);
        match self.roots.get(descriptor.tag) {
            Some(type_id) if *type_id == descriptor.type_id => {}
            Some(_) => {
                debug!(
                    element = descriptor.tag,
                    type_name = %type_name,
                    "Skipping top-level element already declared by another type"
                );
            }
            None => {
                self.roots.insert(descriptor.tag, descriptor.type_id);
                self.elements.push(
                    XmlElement::new("xs:element")
                        .attr("name", descriptor.tag)
                        .attr("type", type_name),
                );
            }
        }
    }

    fn type_name(&mut self, descriptor: &SchemaDescriptor) -> String {
        if let Some(name) = self.names.get(&descriptor.type_id) {
            return name.clone();
        }

        let mut name = descriptor.type_name.to_string();
        let mut suffix = 2;
        while self.taken.contains(&name) {
            name = format!("{}{}", descriptor.type_name, suffix);
            suffix += 1;
        }

        self.taken.insert(name.clone());
        self.names.insert(descriptor.type_id, name.clone());
        self.pending.push_back(descriptor.clone());
        name
    }

    fn reference(&mut self, schema: &SchemaRef) -> String {
        match self.names.get(&schema.type_id()) {
            Some(name) => name.clone(),
            None => self.type_name(&schema.describe()),
        }
    }

    fn field_type(&mut self, kind: &FieldKind) -> String {
        match kind {
            FieldKind::Scalar(scalar) => format!("xs:{}", scalar.xsd_type()),
            FieldKind::Complex(schema) => self.reference(schema),
        }
    }

    fn finish(mut self) -> XmlElement {
        let mut complex_types = Vec::new();
        while let Some(descriptor) = self.pending.pop_front() {
            complex_types.push(self.complex_type(&descriptor));
        }

        let mut schema = XmlElement::new("xs:schema").attr("elementFormDefault", "unqualified");
        for element in self.elements.drain(..) {
            schema.push(element);
        }
        for complex_type in complex_types {
            schema.push(complex_type);
        }
        schema
    }

    fn complex_type(&mut self, descriptor: &SchemaDescriptor) -> XmlElement {
        let name = self.type_name(descriptor);
        let mut complex_type = XmlElement::new("xs:complexType").attr("name", name);

        let mut elements = Vec::new();
        let mut attributes = Vec::new();
        let mut text = Vec::new();
        for field in &descriptor.fields {
            match &field.binding {
                FieldBinding::Element(tag) => elements.push(self.element_field(tag, field)),
                FieldBinding::Attribute(attr) => attributes.push(self.attribute_field(attr, field)),
                FieldBinding::Text => text.push(field),
            }
        }

        // Several text fields share the content, so only a single one maps
        // to a typed simpleContent.
        match text.as_slice() {
            [field] if elements.is_empty() => {
                let base = match field.kind {
                    FieldKind::Scalar(scalar) => format!("xs:{}", scalar.xsd_type()),
                    FieldKind::Complex(_) => "xs:string".to_string(),
                };
                let mut extension = XmlElement::new("xs:extension").attr("base", base);
                for attribute in attributes {
                    extension.push(attribute);
                }
                complex_type.push(XmlElement::new("xs:simpleContent").child(extension));
                return complex_type;
            }
            [] => {}
            _ => complex_type.set_attribute("mixed", "true"),
        }

        if !elements.is_empty() {
            let mut sequence = XmlElement::new("xs:sequence");
            for element in elements {
                sequence.push(element);
            }
            complex_type.push(sequence);
        }
        for attribute in attributes {
            complex_type.push(attribute);
        }
        complex_type
    }

    fn element_field(&mut self, tag: &str, field: &FieldDescriptor) -> XmlElement {
        let mut element = XmlElement::new("xs:element")
            .attr("name", tag)
            .attr("type", self.field_type(&field.kind));

        match field.cardinality {
            Cardinality::Required => {}
            Cardinality::Optional => element.set_attribute("minOccurs", "0"),
            Cardinality::Repeated { min, max } => {
                element.set_attribute("minOccurs", min.to_string());
                element.set_attribute(
                    "maxOccurs",
                    max.map_or_else(|| "unbounded".to_string(), |max| max.to_string()),
                );
            }
        }
        element
    }

    fn attribute_field(&mut self, name: &str, field: &FieldDescriptor) -> XmlElement {
        let attribute_type = match field.kind {
            FieldKind::Scalar(scalar) => format!("xs:{}", scalar.xsd_type()),
            FieldKind::Complex(_) => "xs:string".to_string(),
        };
        let mut attribute = XmlElement::new("xs:attribute")
            .attr("name", name)
            .attr("type", attribute_type);
        if field.cardinality == Cardinality::Required {
            attribute.set_attribute("use", "required");
        }
        attribute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OperationRecord;

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct Operands => "Operands" {
            operands: Vec<f64> => element("Operand"),
        }
    }

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct Total => "Result" {
            value: f64 => text(),
        }
    }

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct Money => "Money" {
            currency: String => attribute("currency"),
            amount: f64 => text(),
        }
    }

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct Transfer => "Transfer" {
            from: String => element("From"),
            amount: Money,
            memo: Option<String> => element("Memo"),
            reference: Option<String> => attribute("ref"),
        }
    }

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct Receipt => "Receipt" {
            amount: Money,
            tags: Vec<String> => element("Tag").min_occurs(1).max_occurs(5),
        }
    }

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct Note => "Note" {
            author: String => element("Author"),
            body: String => text(),
        }
    }

    crate::soap_schema! {
        #[derive(Debug, Clone, PartialEq)]
        struct Category => "Category" {
            name: String => attribute("name"),
            children: Vec<Category>,
        }
    }

    mod other {
        crate::soap_schema! {
            #[derive(Debug, Clone, PartialEq)]
            pub struct Total => "Total" {
                pub value: i64 => text(),
            }
        }

        crate::soap_schema! {
            #[derive(Debug, Clone, PartialEq)]
            pub struct Outcome => "Result" {
                pub code: String => element("Code"),
            }
        }

        crate::soap_schema! {
            #[derive(Debug, Clone, PartialEq)]
            pub struct Label => "Label" {
                pub prefix: String => text(),
                pub suffix: String => text(),
            }
        }
    }

    fn descendants<'a>(element: &'a XmlElement, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in element.elements() {
            if child.name == name {
                found.push(child);
            }
            descendants(child, name, found);
        }
    }

    fn all<'a>(element: &'a XmlElement, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        descendants(element, name, &mut found);
        found
    }

    fn named<'a>(elements: &[&'a XmlElement], name: &str) -> &'a XmlElement {
        elements
            .iter()
            .copied()
            .find(|e| e.attribute("name") == Some(name))
            .unwrap()
    }

    fn calculator() -> ServiceDescriptor {
        ServiceDescriptor {
            name: "Calculator".to_string(),
            prefix: "/Calculator".to_string(),
            documentation: "Simple arithmetic".to_string(),
            operations: vec![OperationRecord::new("Sum")
                .request::<Operands>()
                .response::<Total>()],
        }
    }

    #[test]
    fn test_document_layout() {
        let wsdl = generate(&calculator(), "http://localhost:8000/Calculator/");
        assert_eq!(wsdl.qualified_name(), "wsdl:definitions");
        assert_eq!(wsdl.attribute("name"), Some("Calculator"));
        assert!(wsdl
            .attributes
            .contains(&("xmlns:soap".to_string(), WSDL_SOAP_NS.to_string())));

        let order: Vec<&str> = wsdl.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(
            order,
            vec!["documentation", "types", "message", "message", "portType", "binding", "service"]
        );
        assert_eq!(wsdl.find("documentation").unwrap().text(), "Simple arithmetic");
    }

    #[test]
    fn test_operation_wiring() {
        let wsdl = generate(&calculator(), "http://localhost:8000/Calculator");

        let messages: Vec<&XmlElement> = wsdl.elements_named("message").collect();
        let request = named(&messages, "SumRequest");
        let part = request.find("part").unwrap();
        assert_eq!(part.attribute("name"), Some("parameters"));
        assert_eq!(part.attribute("element"), Some("Operands"));
        assert_eq!(
            named(&messages, "SumResponse").find("part").unwrap().attribute("element"),
            Some("Result")
        );

        let port_type = wsdl.find("portType").unwrap();
        let operation = port_type.find("operation").unwrap();
        assert_eq!(operation.attribute("name"), Some("CalculatorSum"));
        assert_eq!(operation.find("input").unwrap().attribute("message"), Some("SumRequest"));
        assert_eq!(operation.find("output").unwrap().attribute("message"), Some("SumResponse"));

        let binding = wsdl.find("binding").unwrap();
        assert_eq!(binding.attribute("name"), Some("CalculatorSum"));
        assert_eq!(binding.attribute("type"), Some("Calculator"));
        let soap_binding = binding.find("binding").unwrap();
        assert_eq!(soap_binding.attribute("style"), Some("document"));
        assert_eq!(soap_binding.attribute("transport"), Some(SOAP_HTTP_TRANSPORT));
        let binding_operation = binding.find("operation").unwrap();
        assert_eq!(
            binding_operation.find("operation").unwrap().attribute("soapAction"),
            Some("Sum")
        );
        let input = binding_operation.find("input").unwrap();
        assert_eq!(input.find("body").unwrap().attribute("use"), Some("literal"));

        let port = wsdl.find("service").unwrap().find("port").unwrap();
        assert_eq!(port.attribute("binding"), Some("CalculatorSum"));
        assert_eq!(
            port.find("address").unwrap().attribute("location"),
            Some("http://localhost:8000/Calculator/Sum")
        );
    }

    #[test]
    fn test_missing_sides_are_skipped() {
        let mut service = calculator();
        service.operations = vec![OperationRecord::new("Ping")];
        let wsdl = generate(&service, "http://localhost");

        assert_eq!(wsdl.elements_named("message").count(), 0);
        let operation = wsdl.find("portType").unwrap().find("operation").unwrap();
        assert_eq!(operation.elements().count(), 0);
        assert_eq!(all(&wsdl, "complexType").len(), 0);
    }

    #[test]
    fn test_xsd_types() {
        let wsdl = generate(&calculator(), "http://localhost");
        let schema = wsdl.find("types").unwrap().find("schema").unwrap();
        assert_eq!(schema.attribute("elementFormDefault"), Some("unqualified"));

        let roots: Vec<&XmlElement> = schema.elements_named("element").collect();
        assert_eq!(named(&roots, "Operands").attribute("type"), Some("Operands"));
        assert_eq!(named(&roots, "Result").attribute("type"), Some("Total"));

        let types: Vec<&XmlElement> = schema.elements_named("complexType").collect();
        assert_eq!(types.len(), 2);

        let operand = named(&types, "Operands")
            .find("sequence")
            .unwrap()
            .find("element")
            .unwrap();
        assert_eq!(operand.attribute("name"), Some("Operand"));
        assert_eq!(operand.attribute("type"), Some("xs:double"));
        assert_eq!(operand.attribute("minOccurs"), Some("0"));
        assert_eq!(operand.attribute("maxOccurs"), Some("unbounded"));

        let extension = named(&types, "Total")
            .find("simpleContent")
            .unwrap()
            .find("extension")
            .unwrap();
        assert_eq!(extension.attribute("base"), Some("xs:double"));
    }

    #[test]
    fn test_shared_types_are_deduplicated() {
        let service = ServiceDescriptor {
            name: "Bank".to_string(),
            prefix: "/Bank".to_string(),
            documentation: String::new(),
            operations: vec![
                OperationRecord::new("Transfer")
                    .request::<Transfer>()
                    .response::<Receipt>(),
                OperationRecord::new("Refund")
                    .request::<Transfer>()
                    .response::<Receipt>(),
            ],
        };
        let wsdl = generate(&service, "http://bank");
        let schema = wsdl.find("types").unwrap().find("schema").unwrap();

        assert_eq!(schema.elements_named("element").count(), 2);
        let types: Vec<&XmlElement> = schema.elements_named("complexType").collect();
        let names: Vec<&str> = types.iter().filter_map(|t| t.attribute("name")).collect();
        assert_eq!(names, vec!["Transfer", "Receipt", "Money"]);

        let money = named(&types, "Money");
        let extension = money.find("simpleContent").unwrap().find("extension").unwrap();
        let currency = extension.find("attribute").unwrap();
        assert_eq!(currency.attribute("name"), Some("currency"));
        assert_eq!(currency.attribute("use"), Some("required"));

        let transfer = named(&types, "Transfer");
        let fields: Vec<&XmlElement> = transfer.find("sequence").unwrap().elements().collect();
        assert_eq!(named(&fields, "Money").attribute("type"), Some("Money"));
        assert_eq!(named(&fields, "Memo").attribute("minOccurs"), Some("0"));
        assert_eq!(named(&fields, "From").attribute("minOccurs"), None);
        let reference = transfer.find("attribute").unwrap();
        assert_eq!(reference.attribute("use"), None);

        let receipt = named(&types, "Receipt");
        let tags: Vec<&XmlElement> = receipt.find("sequence").unwrap().elements().collect();
        let tag = named(&tags, "Tag");
        assert_eq!(tag.attribute("minOccurs"), Some("1"));
        assert_eq!(tag.attribute("maxOccurs"), Some("5"));
    }

    #[test]
    fn test_mixed_and_recursive_types() {
        let service = ServiceDescriptor {
            name: "Notes".to_string(),
            prefix: String::new(),
            documentation: String::new(),
            operations: vec![OperationRecord::new("Add")
                .request::<Note>()
                .response::<Category>()],
        };
        let wsdl = generate(&service, "http://notes");
        let types = all(&wsdl, "complexType");
        assert_eq!(types.len(), 2);

        assert_eq!(named(&types, "Note").attribute("mixed"), Some("true"));

        let category = named(&types, "Category");
        let child = category.find("sequence").unwrap().find("element").unwrap();
        assert_eq!(child.attribute("name"), Some("Category"));
        assert_eq!(child.attribute("type"), Some("Category"));
    }

    #[test]
    fn test_type_name_collisions() {
        let service = ServiceDescriptor {
            name: "Calc".to_string(),
            prefix: String::new(),
            documentation: String::new(),
            operations: vec![
                OperationRecord::new("Sum").response::<Total>(),
                OperationRecord::new("Count").response::<other::Total>(),
            ],
        };
        let wsdl = generate(&service, "http://calc");
        let names: Vec<String> = all(&wsdl, "complexType")
            .iter()
            .filter_map(|t| t.attribute("name").map(str::to_string))
            .collect();
        assert_eq!(names, vec!["Total", "Total2"]);
    }

    #[test]
    fn test_shared_tag_declared_once() {
        let service = ServiceDescriptor {
            name: "Calc".to_string(),
            prefix: String::new(),
            documentation: String::new(),
            operations: vec![
                OperationRecord::new("Sum").response::<Total>(),
                OperationRecord::new("Check").response::<other::Outcome>(),
            ],
        };
        let wsdl = generate(&service, "http://calc");
        let schema = wsdl.find("types").unwrap().find("schema").unwrap();

        let roots: Vec<&XmlElement> = schema.elements_named("element").collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].attribute("name"), Some("Result"));
        assert_eq!(roots[0].attribute("type"), Some("Total"));

        let names: Vec<&str> = schema
            .elements_named("complexType")
            .filter_map(|t| t.attribute("name"))
            .collect();
        assert_eq!(names, vec!["Total", "Outcome"]);
    }

    #[test]
    fn test_several_text_fields_are_mixed() {
        let service = ServiceDescriptor {
            name: "Labels".to_string(),
            prefix: String::new(),
            documentation: String::new(),
            operations: vec![OperationRecord::new("Print").request::<other::Label>()],
        };
        let wsdl = generate(&service, "http://labels");
        let types = all(&wsdl, "complexType");
        let label = named(&types, "Label");
        assert_eq!(label.attribute("mixed"), Some("true"));
        assert!(label.find("simpleContent").is_none());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = to_xml_string(&calculator(), "http://a").unwrap();
        let second = to_xml_string(&calculator(), "http://a").unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("<?xml"));
    }
}
