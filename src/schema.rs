//! Schema model: typed payloads and their XML mapping.
//!
//! A schema type is a plain struct declared with [`soap_schema!`], which
//! fixes its root tag (and optional namespace) and binds every field to an
//! element, the element text, or an attribute. Field cardinality follows the
//! Rust type: `T` is required, `Option<T>` optional, `Vec<T>` repeated.
//!
//! ```
//! use soap_service::soap_schema;
//!
//! soap_schema! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Operands => "Operands" {
//!         pub operands: Vec<f64> => element("Operand"),
//!     }
//! }
//! ```
//!
//! Every schema also describes itself through [`SchemaDescriptor`], which is
//! what the WSDL reflector walks.

use crate::error::SchemaError;
use crate::xml::XmlElement;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use std::any::TypeId;
use std::fmt;
use std::num::{NonZeroU32, NonZeroU64};
use url::Url;

/// Scalar kinds with a fixed XSD mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    Time,
    DateTime,
    PositiveInteger,
    AnyUri,
    /// Anything without a dedicated XSD type
    Other,
}

impl ScalarKind {
    /// XSD built-in type name (without prefix).
    pub fn xsd_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "dateTime",
            Self::PositiveInteger => "positiveInteger",
            Self::AnyUri => "anyURI",
            Self::Other => "string",
        }
    }
}

/// Lazy reference to a nested schema type.
#[derive(Clone, Copy)]
pub struct SchemaRef {
    type_id: TypeId,
    describe: fn() -> SchemaDescriptor,
}

impl SchemaRef {
    pub fn of<T: XmlSchema>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            describe: SchemaDescriptor::of::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn describe(&self) -> SchemaDescriptor {
        (self.describe)()
    }
}

impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SchemaRef").field(&self.type_id).finish()
    }
}

impl PartialEq for SchemaRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

/// What a field holds: a scalar or a nested schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Complex(SchemaRef),
}

/// How many times a field may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Required,
    Optional,
    Repeated { min: u32, max: Option<u32> },
}

impl Cardinality {
    pub fn min_occurs(&self) -> u32 {
        match self {
            Self::Required => 1,
            Self::Optional => 0,
            Self::Repeated { min, .. } => *min,
        }
    }

    /// `None` means unbounded.
    pub fn max_occurs(&self) -> Option<u32> {
        match self {
            Self::Required | Self::Optional => Some(1),
            Self::Repeated { max, .. } => *max,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Required => "exactly 1".to_string(),
            Self::Optional => "at most 1".to_string(),
            Self::Repeated { min, max: None } => format!("at least {}", min),
            Self::Repeated {
                min,
                max: Some(max),
            } => format!("between {} and {}", min, max),
        }
    }
}

/// Where a field lives inside its parent element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// Child element(s). An implicit tag defers to the field type's own tag
    /// when it has one.
    Element { tag: String, implicit: bool },
    /// Text content of the parent element
    Text,
    /// Attribute of the parent element
    Attribute(String),
}

/// Field binding declared in [`soap_schema!`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    kind: BindingKind,
    min: Option<u32>,
    max: Option<u32>,
}

impl Binding {
    fn new(kind: BindingKind) -> Self {
        Self {
            kind,
            min: None,
            max: None,
        }
    }

    pub fn kind(&self) -> &BindingKind {
        &self.kind
    }

    /// Lower bound for repeated fields.
    pub fn min_occurs(mut self, min: u32) -> Self {
        self.min = Some(min);
        self
    }

    /// Upper bound for repeated fields.
    pub fn max_occurs(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    /// Element tag, given the field type's natural tag.
    pub fn element_tag<'a>(&'a self, natural: Option<&'static str>) -> Option<&'a str> {
        match &self.kind {
            BindingKind::Element {
                tag,
                implicit: true,
            } => Some(natural.unwrap_or(tag.as_str())),
            BindingKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    fn apply(&self, cardinality: Cardinality) -> Cardinality {
        match cardinality {
            Cardinality::Repeated { min, max } => Cardinality::Repeated {
                min: self.min.unwrap_or(min),
                max: self.max.or(max),
            },
            other => other,
        }
    }
}

/// Binding constructors used inside [`soap_schema!`] field declarations.
pub mod binding {
    use super::{Binding, BindingKind};

    /// Bind to child element(s) with an explicit tag.
    pub fn element(tag: impl Into<String>) -> Binding {
        Binding::new(BindingKind::Element {
            tag: tag.into(),
            implicit: false,
        })
    }

    /// Bind to the text content of the parent element.
    pub fn text() -> Binding {
        Binding::new(BindingKind::Text)
    }

    /// Bind to an attribute of the parent element.
    pub fn attribute(name: impl Into<String>) -> Binding {
        Binding::new(BindingKind::Attribute(name.into()))
    }

    #[doc(hidden)]
    pub fn implicit(field_name: &str) -> Binding {
        Binding::new(BindingKind::Element {
            tag: field_name.to_string(),
            implicit: true,
        })
    }
}

/// Resolved field binding, as exposed for reflection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldBinding {
    Element(String),
    Text,
    Attribute(String),
}

/// Reflection data for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub binding: FieldBinding,
    pub cardinality: Cardinality,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn of<F: XmlField>(name: &'static str, binding: Binding) -> Self {
        let resolved = match &binding.kind {
            BindingKind::Element { .. } => FieldBinding::Element(
                binding
                    .element_tag(F::item_tag())
                    .unwrap_or(name)
                    .to_string(),
            ),
            BindingKind::Text => FieldBinding::Text,
            BindingKind::Attribute(attr) => FieldBinding::Attribute(attr.clone()),
        };

        Self {
            name,
            cardinality: binding.apply(F::cardinality()),
            binding: resolved,
            kind: F::item_kind(),
        }
    }
}

/// Reflection data for one schema type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    pub type_id: TypeId,
    /// Rust type name without module path
    pub type_name: &'static str,
    pub tag: &'static str,
    pub namespace: Option<&'static str>,
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    pub fn of<T: XmlSchema>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: short_type_name(std::any::type_name::<T>()),
            tag: T::TAG,
            namespace: T::NAMESPACE,
            fields: T::fields(),
        }
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A type with a fixed root tag that maps to and from an XML element.
///
/// Implemented by [`soap_schema!`]. Payloads, faults and headers are all
/// schema types; the envelope wrappers are generic over this trait.
pub trait XmlSchema: Sized + 'static {
    const TAG: &'static str;
    const NAMESPACE: Option<&'static str> = None;

    /// Field descriptors in declaration order.
    fn fields() -> Vec<FieldDescriptor>;

    /// Write all fields into `element`.
    fn write_fields(&self, element: &mut XmlElement);

    /// Read all fields from `element`.
    fn read_fields(element: &XmlElement) -> Result<Self, SchemaError>;

    /// Root element for this value.
    fn to_element(&self) -> XmlElement {
        schema_element(self, Self::TAG)
    }

    /// Parse a root element, checking tag and namespace.
    fn from_element(element: &XmlElement) -> Result<Self, SchemaError> {
        if element.name != Self::TAG {
            return Err(SchemaError::UnexpectedElement {
                expected: Self::TAG.to_string(),
                found: element.qualified_name().into_owned(),
            });
        }
        if let Some(ns) = Self::NAMESPACE {
            if element.namespace.as_deref() != Some(ns) {
                return Err(SchemaError::Namespace {
                    element: Self::TAG.to_string(),
                    expected: Some(ns.to_string()),
                    found: element.namespace.clone(),
                });
            }
        }
        Self::read_fields(element)
    }

    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor::of::<Self>()
    }
}

/// Build the element for a schema value under an arbitrary tag.
pub fn schema_element<T: XmlSchema>(value: &T, tag: &str) -> XmlElement {
    let mut element = XmlElement::new(tag);
    if let Some(ns) = T::NAMESPACE {
        element.namespace = Some(ns.to_string());
        element.set_attribute("xmlns", ns);
    }
    value.write_fields(&mut element);
    element
}

/// One occurrence of a field value.
pub trait XmlValue: Sized {
    fn kind() -> FieldKind;

    /// Tag the value carries on its own (schema types only).
    fn natural_tag() -> Option<&'static str> {
        None
    }

    /// Text form, `None` for values without simple content.
    fn to_text(&self) -> Option<String>;

    fn from_text(text: &str, tag: &str) -> Result<Self, SchemaError>;

    fn write_value(&self, tag: &str) -> XmlElement;

    fn read_value(element: &XmlElement) -> Result<Self, SchemaError>;
}

/// A field of a schema type: a value plus its cardinality.
pub trait XmlField: Sized {
    fn cardinality() -> Cardinality;

    fn item_kind() -> FieldKind;

    fn item_tag() -> Option<&'static str>;

    fn write(&self, binding: &Binding, parent: &mut XmlElement);

    fn read(binding: &Binding, parent: &XmlElement) -> Result<Self, SchemaError>;
}

/// A scalar with a text representation.
///
/// Register custom implementations with [`soap_scalar!`].
pub trait XmlScalar: Sized {
    const KIND: ScalarKind;

    fn format(&self) -> String;

    fn parse(text: &str) -> Option<Self>;
}

#[doc(hidden)]
pub fn parse_scalar<T: XmlScalar>(text: &str, tag: &str) -> Result<T, SchemaError> {
    T::parse(text).ok_or_else(|| SchemaError::InvalidValue {
        tag: tag.to_string(),
        value: text.to_string(),
        expected: T::KIND.xsd_type().to_string(),
    })
}

#[doc(hidden)]
pub fn complex_from_text<T>(text: &str, tag: &str) -> Result<T, SchemaError> {
    Err(SchemaError::InvalidValue {
        tag: tag.to_string(),
        value: text.to_string(),
        expected: "complex content".to_string(),
    })
}

fn occurrences<'a>(parent: &'a XmlElement, tag: &'a str) -> Vec<&'a XmlElement> {
    parent.elements_named(tag).collect()
}

fn cardinality_error(parent: &XmlElement, tag: &str, found: usize, expected: Cardinality) -> SchemaError {
    SchemaError::Cardinality {
        parent: parent.name.clone(),
        tag: tag.to_string(),
        found,
        expected: expected.describe(),
    }
}

#[doc(hidden)]
pub fn write_required<T: XmlValue>(value: &T, binding: &Binding, parent: &mut XmlElement) {
    match &binding.kind {
        BindingKind::Element { .. } => {
            let tag = binding.element_tag(T::natural_tag()).unwrap_or_default();
            parent.push(value.write_value(tag));
        }
        BindingKind::Text => {
            if let Some(text) = value.to_text() {
                parent.push_text(text);
            }
        }
        BindingKind::Attribute(name) => {
            if let Some(text) = value.to_text() {
                parent.set_attribute(name, text);
            }
        }
    }
}

#[doc(hidden)]
pub fn read_required<T: XmlValue>(binding: &Binding, parent: &XmlElement) -> Result<T, SchemaError> {
    match &binding.kind {
        BindingKind::Element { .. } => {
            let tag = binding.element_tag(T::natural_tag()).unwrap_or_default();
            match occurrences(parent, tag).as_slice() {
                [] => Err(SchemaError::MissingElement {
                    parent: parent.name.clone(),
                    tag: tag.to_string(),
                }),
                [element] => T::read_value(element),
                found => Err(cardinality_error(parent, tag, found.len(), Cardinality::Required)),
            }
        }
        BindingKind::Text => T::from_text(&parent.text(), &parent.name),
        BindingKind::Attribute(name) => match parent.attribute(name) {
            Some(value) => T::from_text(value, name),
            None => Err(SchemaError::MissingAttribute {
                parent: parent.name.clone(),
                name: name.clone(),
            }),
        },
    }
}

#[doc(hidden)]
pub fn read_optional<T: XmlValue>(
    binding: &Binding,
    parent: &XmlElement,
) -> Result<Option<T>, SchemaError> {
    match &binding.kind {
        BindingKind::Element { .. } => {
            let tag = binding.element_tag(T::natural_tag()).unwrap_or_default();
            match occurrences(parent, tag).as_slice() {
                [] => Ok(None),
                [element] => T::read_value(element).map(Some),
                found => Err(cardinality_error(parent, tag, found.len(), Cardinality::Optional)),
            }
        }
        BindingKind::Text => {
            let text = parent.text();
            if text.is_empty() {
                Ok(None)
            } else {
                T::from_text(&text, &parent.name).map(Some)
            }
        }
        BindingKind::Attribute(name) => parent
            .attribute(name)
            .map(|value| T::from_text(value, name))
            .transpose(),
    }
}

#[doc(hidden)]
pub fn write_repeated<T: XmlValue>(values: &[T], binding: &Binding, parent: &mut XmlElement) {
    match &binding.kind {
        BindingKind::Element { .. } => {
            let tag = binding.element_tag(T::natural_tag()).unwrap_or_default();
            for value in values {
                parent.push(value.write_value(tag));
            }
        }
        BindingKind::Text => {
            let text = join_list(values);
            if !text.is_empty() {
                parent.push_text(text);
            }
        }
        BindingKind::Attribute(name) => {
            let text = join_list(values);
            if !text.is_empty() {
                parent.set_attribute(name, text);
            }
        }
    }
}

fn join_list<T: XmlValue>(values: &[T]) -> String {
    values
        .iter()
        .filter_map(|value| value.to_text())
        .collect::<Vec<_>>()
        .join(" ")
}

#[doc(hidden)]
pub fn read_repeated<T: XmlValue>(binding: &Binding, parent: &XmlElement) -> Result<Vec<T>, SchemaError> {
    let cardinality = binding.apply(Cardinality::Repeated { min: 0, max: None });

    let (tag, values) = match &binding.kind {
        BindingKind::Element { .. } => {
            let tag = binding.element_tag(T::natural_tag()).unwrap_or_default();
            let found = occurrences(parent, tag);
            check_occurs(parent, tag, found.len(), cardinality)?;
            let values = found
                .into_iter()
                .map(T::read_value)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(values);
        }
        BindingKind::Text => (parent.name.clone(), parent.text()),
        BindingKind::Attribute(name) => (
            name.clone(),
            parent.attribute(name).unwrap_or_default().to_string(),
        ),
    };

    let items: Vec<&str> = values.split_whitespace().collect();
    check_occurs(parent, &tag, items.len(), cardinality)?;
    items
        .into_iter()
        .map(|item| T::from_text(item, &tag))
        .collect()
}

fn check_occurs(
    parent: &XmlElement,
    tag: &str,
    found: usize,
    cardinality: Cardinality,
) -> Result<(), SchemaError> {
    let below = found < cardinality.min_occurs() as usize;
    let above = cardinality
        .max_occurs()
        .is_some_and(|max| found > max as usize);
    if below || above {
        return Err(cardinality_error(parent, tag, found, cardinality));
    }
    Ok(())
}

impl<T: XmlValue> XmlField for Option<T> {
    fn cardinality() -> Cardinality {
        Cardinality::Optional
    }

    fn item_kind() -> FieldKind {
        T::kind()
    }

    fn item_tag() -> Option<&'static str> {
        T::natural_tag()
    }

    fn write(&self, binding: &Binding, parent: &mut XmlElement) {
        if let Some(value) = self {
            write_required(value, binding, parent);
        }
    }

    fn read(binding: &Binding, parent: &XmlElement) -> Result<Self, SchemaError> {
        read_optional(binding, parent)
    }
}

impl<T: XmlValue> XmlField for Vec<T> {
    fn cardinality() -> Cardinality {
        Cardinality::Repeated { min: 0, max: None }
    }

    fn item_kind() -> FieldKind {
        T::kind()
    }

    fn item_tag() -> Option<&'static str> {
        T::natural_tag()
    }

    fn write(&self, binding: &Binding, parent: &mut XmlElement) {
        write_repeated(self, binding, parent);
    }

    fn read(binding: &Binding, parent: &XmlElement) -> Result<Self, SchemaError> {
        read_repeated(binding, parent)
    }
}

/// Declare a schema type.
///
/// Fields default to a child element named after the field, or after the
/// field type's own tag for nested schemas. Override with
/// `=> element("Tag")`, `=> text()` or `=> attribute("name")`; repeated
/// element bindings take `.min_occurs(n)` / `.max_occurs(n)`.
///
/// ```
/// use soap_service::soap_schema;
///
/// soap_schema! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Quote => "Quote" in "urn:example:stock" {
///         pub symbol: String => attribute("symbol"),
///         pub price: f64 => text(),
///     }
/// }
/// ```
#[macro_export]
macro_rules! soap_schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $tag:literal $(in $ns:literal)? {
            $(
                $(#[doc = $doc:literal])*
                $fvis:vis $field:ident : $fty:ty $(=> $binding:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::schema::XmlSchema for $name {
            const TAG: &'static str = $tag;
            const NAMESPACE: ::core::option::Option<&'static str> =
                $crate::__soap_namespace!($($ns)?);

            fn fields() -> ::std::vec::Vec<$crate::schema::FieldDescriptor> {
                ::std::vec![
                    $(
                        $crate::schema::FieldDescriptor::of::<$fty>(
                            ::core::stringify!($field),
                            $crate::__soap_binding!($field $(, $binding)?),
                        ),
                    )*
                ]
            }

            #[allow(unused_variables)]
            fn write_fields(&self, element: &mut $crate::xml::XmlElement) {
                $(
                    <$fty as $crate::schema::XmlField>::write(
                        &self.$field,
                        &$crate::__soap_binding!($field $(, $binding)?),
                        element,
                    );
                )*
            }

            #[allow(unused_variables)]
            fn read_fields(
                element: &$crate::xml::XmlElement,
            ) -> ::core::result::Result<Self, $crate::error::SchemaError> {
                ::core::result::Result::Ok(Self {
                    $(
                        $field: <$fty as $crate::schema::XmlField>::read(
                            &$crate::__soap_binding!($field $(, $binding)?),
                            element,
                        )?,
                    )*
                })
            }
        }

        impl $crate::schema::XmlValue for $name {
            fn kind() -> $crate::schema::FieldKind {
                $crate::schema::FieldKind::Complex($crate::schema::SchemaRef::of::<Self>())
            }

            fn natural_tag() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(<Self as $crate::schema::XmlSchema>::TAG)
            }

            fn to_text(&self) -> ::core::option::Option<::std::string::String> {
                ::core::option::Option::None
            }

            fn from_text(
                text: &str,
                tag: &str,
            ) -> ::core::result::Result<Self, $crate::error::SchemaError> {
                $crate::schema::complex_from_text(text, tag)
            }

            fn write_value(&self, tag: &str) -> $crate::xml::XmlElement {
                $crate::schema::schema_element(self, tag)
            }

            fn read_value(
                element: &$crate::xml::XmlElement,
            ) -> ::core::result::Result<Self, $crate::error::SchemaError> {
                <Self as $crate::schema::XmlSchema>::read_fields(element)
            }
        }

        impl $crate::schema::XmlField for $name {
            $crate::__soap_single_field!();
        }
    };
}

/// Register scalar types implementing [`XmlScalar`] as field values.
#[macro_export]
macro_rules! soap_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::schema::XmlValue for $ty {
                fn kind() -> $crate::schema::FieldKind {
                    $crate::schema::FieldKind::Scalar(<$ty as $crate::schema::XmlScalar>::KIND)
                }

                fn to_text(&self) -> ::core::option::Option<::std::string::String> {
                    ::core::option::Option::Some($crate::schema::XmlScalar::format(self))
                }

                fn from_text(
                    text: &str,
                    tag: &str,
                ) -> ::core::result::Result<Self, $crate::error::SchemaError> {
                    $crate::schema::parse_scalar(text, tag)
                }

                fn write_value(&self, tag: &str) -> $crate::xml::XmlElement {
                    $crate::xml::XmlElement::with_text(tag, $crate::schema::XmlScalar::format(self))
                }

                fn read_value(
                    element: &$crate::xml::XmlElement,
                ) -> ::core::result::Result<Self, $crate::error::SchemaError> {
                    $crate::schema::parse_scalar(&element.text(), &element.name)
                }
            }

            impl $crate::schema::XmlField for $ty {
                $crate::__soap_single_field!();
            }
        )+
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __soap_namespace {
    () => {
        ::core::option::Option::None
    };
    ($ns:literal) => {
        ::core::option::Option::Some($ns)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __soap_binding {
    ($field:ident) => {
        $crate::schema::binding::implicit(::core::stringify!($field))
    };
    ($field:ident, $binding:expr) => {{
        #[allow(unused_imports)]
        use $crate::schema::binding::*;
        $binding
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __soap_single_field {
    () => {
        fn cardinality() -> $crate::schema::Cardinality {
            $crate::schema::Cardinality::Required
        }

        fn item_kind() -> $crate::schema::FieldKind {
            <Self as $crate::schema::XmlValue>::kind()
        }

        fn item_tag() -> ::core::option::Option<&'static str> {
            <Self as $crate::schema::XmlValue>::natural_tag()
        }

        fn write(&self, binding: &$crate::schema::Binding, parent: &mut $crate::xml::XmlElement) {
            $crate::schema::write_required(self, binding, parent)
        }

        fn read(
            binding: &$crate::schema::Binding,
            parent: &$crate::xml::XmlElement,
        ) -> ::core::result::Result<Self, $crate::error::SchemaError> {
            $crate::schema::read_required(binding, parent)
        }
    };
}

macro_rules! from_str_scalar {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl XmlScalar for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn format(&self) -> String {
                    self.to_string()
                }

                fn parse(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }
            }
        )+
    };
}

from_str_scalar! {
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Integer,
    isize => Integer,
    u8 => Integer,
    u16 => Integer,
    u32 => Integer,
    u64 => Integer,
    usize => Integer,
    NonZeroU32 => PositiveInteger,
    NonZeroU64 => PositiveInteger,
    NaiveDate => Date,
    NaiveTime => Time,
    Url => AnyUri,
}

impl XmlScalar for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn format(&self) -> String {
        self.clone()
    }

    fn parse(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

impl XmlScalar for bool {
    const KIND: ScalarKind = ScalarKind::Boolean;

    fn format(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl XmlScalar for f64 {
    const KIND: ScalarKind = ScalarKind::Double;

    fn format(&self) -> String {
        format_double(*self)
    }

    fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "INF" | "+INF" => Some(f64::INFINITY),
            "-INF" => Some(f64::NEG_INFINITY),
            "NaN" => Some(f64::NAN),
            other => other.parse().ok(),
        }
    }
}

impl XmlScalar for f32 {
    const KIND: ScalarKind = ScalarKind::Double;

    fn format(&self) -> String {
        format_double(f64::from(*self))
    }

    fn parse(text: &str) -> Option<Self> {
        <f64 as XmlScalar>::parse(text).map(|value| value as f32)
    }
}

impl XmlScalar for NaiveDateTime {
    const KIND: ScalarKind = ScalarKind::DateTime;

    fn format(&self) -> String {
        self.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

impl XmlScalar for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::DateTime;

    fn format(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    fn parse(text: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|value| value.with_timezone(&Utc))
    }
}

/// Render a double in XSD lexical form, keeping a decimal on integral values.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

crate::soap_scalar!(
    String,
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    NonZeroU32,
    NonZeroU64,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
    Url,
);
