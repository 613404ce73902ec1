//! Element values and type signatures
//!
//! [`Element`] is the value union every message body is built from.
//! [`TypeSignature`] is the matching type identity: it tells the codec, at
//! every recursion step, whether a wire node denotes an attribute, an
//! enumeration, a composite, or a list, so decoding never has to infer the
//! kind from node shape alone.

use std::fmt;
use std::sync::Arc;

use super::attribute::{Attribute, AttributeType};
use super::composite::{CompositeDescriptor, CompositeValue};
use super::enumeration::{EnumDescriptor, EnumValue};
use super::list::ElementList;

/// Type identity used to drive signature-directed decoding
#[derive(Debug, Clone)]
pub enum TypeSignature {
    /// A concrete scalar type
    Attribute(AttributeType),
    /// Any attribute; the concrete type is named on the wire
    AbstractAttribute,
    /// An enumeration type
    Enumeration(Arc<EnumDescriptor>),
    /// A composite type
    Composite(Arc<CompositeDescriptor>),
    /// A homogeneous list of the inner signature
    List(Box<TypeSignature>),
}

impl TypeSignature {
    /// List signature over this item type
    #[must_use]
    pub fn list_of(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Short form of the concrete type, if this signature names one
    ///
    /// The list form is the negated short form of the item type; the
    /// abstract attribute has none.
    #[must_use]
    pub fn short_form(&self) -> Option<i64> {
        match self {
            Self::Attribute(ty) => Some(ty.short_form()),
            Self::AbstractAttribute => None,
            Self::Enumeration(desc) => Some(desc.short_form()),
            Self::Composite(desc) => Some(desc.short_form()),
            Self::List(item) => item.short_form().map(|sf| -sf),
        }
    }

    /// Type name, used for unnamed wire element nodes
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Attribute(ty) => ty.name().to_string(),
            Self::AbstractAttribute => String::from("Attribute"),
            Self::Enumeration(desc) => desc.name().to_string(),
            Self::Composite(desc) => desc.name().to_string(),
            Self::List(item) => format!("{}List", item.type_name()),
        }
    }

    /// Whether `element` is a value of this type
    ///
    /// Null values match any signature; nullability is a per-field concern
    /// checked by composite construction, not a type property.
    #[must_use]
    pub fn admits(&self, element: &Element) -> bool {
        match (self, element) {
            (_, Element::Null(_)) => true,
            (Self::Attribute(ty), Element::Attribute(attr)) => attr.attribute_type() == *ty,
            (Self::AbstractAttribute, Element::Attribute(_)) => true,
            (Self::Enumeration(desc), Element::Enumeration(value)) => {
                value.short_form() == desc.short_form()
            }
            (Self::Composite(desc), Element::Composite(value)) => {
                value.short_form() == desc.short_form()
            }
            (Self::List(item), Element::List(list)) => list.item_signature() == item.as_ref(),
            _ => false,
        }
    }
}

impl PartialEq for TypeSignature {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Attribute(a), Self::Attribute(b)) => a == b,
            (Self::AbstractAttribute, Self::AbstractAttribute) => true,
            (Self::Enumeration(a), Self::Enumeration(b)) => a.short_form() == b.short_form(),
            (Self::Composite(a), Self::Composite(b)) => a.short_form() == b.short_form(),
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A wire-representable value
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A scalar value
    Attribute(Attribute),
    /// An enumeration value
    Enumeration(EnumValue),
    /// A fixed-arity named-field aggregate
    Composite(CompositeValue),
    /// A variable-length homogeneous list
    List(ElementList),
    /// A null of the given type
    Null(TypeSignature),
}

impl Element {
    /// Null value of the given type
    #[must_use]
    pub fn null_of(signature: TypeSignature) -> Self {
        Self::Null(signature)
    }

    /// True for null values
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    /// Type signature of this value
    #[must_use]
    pub fn signature(&self) -> TypeSignature {
        match self {
            Self::Attribute(attr) => TypeSignature::Attribute(attr.attribute_type()),
            Self::Enumeration(value) => TypeSignature::Enumeration(Arc::clone(value.descriptor())),
            Self::Composite(value) => TypeSignature::Composite(Arc::clone(value.descriptor())),
            Self::List(list) => list.item_signature().clone().list_of(),
            Self::Null(signature) => signature.clone(),
        }
    }

    /// Type name, used for unnamed wire element nodes
    #[must_use]
    pub fn type_name(&self) -> String {
        self.signature().type_name()
    }
}

impl From<Attribute> for Element {
    fn from(value: Attribute) -> Self {
        Self::Attribute(value)
    }
}

impl From<EnumValue> for Element {
    fn from(value: EnumValue) -> Self {
        Self::Enumeration(value)
    }
}

impl From<CompositeValue> for Element {
    fn from(value: CompositeValue) -> Self {
        Self::Composite(value)
    }
}

impl From<ElementList> for Element {
    fn from(value: ElementList) -> Self {
        Self::List(value)
    }
}
