//! MAL composite types
//!
//! A composite is an ordered, fixed-arity aggregate of named fields. A
//! composite type may extend another composite; inheritance is modeled
//! explicitly as "parent field list + own field list", with the wire order
//! being all parent fields first. Field offsets are a computed property of
//! the descriptor, never implicit slot concatenation.

use std::fmt;
use std::sync::Arc;

use crate::protocol::{Error, Result};

use super::element::{Element, TypeSignature};

/// One field of a composite type
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name, used as the wire node name
    pub name: String,
    /// Declared field type
    pub signature: TypeSignature,
    /// Whether a null value is accepted for this field
    pub nullable: bool,
}

impl FieldDescriptor {
    /// Define a field
    #[must_use]
    pub fn new(name: impl Into<String>, signature: TypeSignature, nullable: bool) -> Self {
        Self {
            name: name.into(),
            signature,
            nullable,
        }
    }
}

/// Type descriptor for a composite
#[derive(Debug)]
pub struct CompositeDescriptor {
    name: String,
    short_form: i64,
    parent: Option<Arc<CompositeDescriptor>>,
    own_fields: Vec<FieldDescriptor>,
}

impl CompositeDescriptor {
    /// Define a composite type
    ///
    /// `parent` contributes its fields ahead of `own_fields` in wire order.
    pub fn new(
        name: impl Into<String>,
        short_form: i64,
        parent: Option<Arc<CompositeDescriptor>>,
        own_fields: Vec<FieldDescriptor>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            short_form,
            parent,
            own_fields,
        })
    }

    /// Type name, used for wire element nodes
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short form identifying this type
    #[must_use]
    pub const fn short_form(&self) -> i64 {
        self.short_form
    }

    /// Parent type, if this composite extends one
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<CompositeDescriptor>> {
        self.parent.as_ref()
    }

    /// Fields declared by this type itself, excluding inherited ones
    #[must_use]
    pub fn own_fields(&self) -> &[FieldDescriptor] {
        &self.own_fields
    }

    /// Index of the first own field within the full field list
    #[must_use]
    pub fn field_offset(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.field_count())
    }

    /// Total number of fields, inherited ones included
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.field_offset() + self.own_fields.len()
    }

    /// All fields in wire order: parent chain first, own fields last
    #[must_use]
    pub fn fields(&self) -> Vec<&FieldDescriptor> {
        let mut fields = self
            .parent
            .as_ref()
            .map_or_else(Vec::new, |p| p.fields());
        fields.extend(self.own_fields.iter());
        fields
    }

    /// Build a value of this type from field values in wire order
    pub fn instantiate(self: &Arc<Self>, values: Vec<Element>) -> Result<CompositeValue> {
        let fields = self.fields();
        if values.len() != fields.len() {
            return Err(Error::FieldCountMismatch {
                composite: self.name.clone(),
                expected: fields.len(),
                got: values.len(),
            });
        }
        for (field, value) in fields.iter().zip(&values) {
            if value.is_null() {
                if !field.nullable {
                    return Err(Error::FieldNotNullable {
                        composite: self.name.clone(),
                        field: field.name.clone(),
                    });
                }
            } else if !field.signature.admits(value) {
                return Err(Error::FieldTypeMismatch {
                    composite: self.name.clone(),
                    field: field.name.clone(),
                    expected: field.signature.type_name(),
                    got: value.type_name(),
                });
            }
        }
        Ok(CompositeValue {
            descriptor: Arc::clone(self),
            values,
        })
    }
}

/// A value of a composite type
///
/// Field values are owned copies in wire order; the value is immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct CompositeValue {
    descriptor: Arc<CompositeDescriptor>,
    values: Vec<Element>,
}

impl CompositeValue {
    /// Descriptor of the composite type
    #[must_use]
    pub fn descriptor(&self) -> &Arc<CompositeDescriptor> {
        &self.descriptor
    }

    /// Short form of the composite type
    #[must_use]
    pub fn short_form(&self) -> i64 {
        self.descriptor.short_form
    }

    /// Field values in wire order
    #[must_use]
    pub fn values(&self) -> &[Element] {
        &self.values
    }

    /// Value of the field at `index` in wire order
    #[must_use]
    pub fn field_at(&self, index: usize) -> Option<&Element> {
        self.values.get(index)
    }

    /// Value of the field with the given name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Element> {
        let index = self
            .descriptor
            .fields()
            .iter()
            .position(|f| f.name == name)?;
        self.values.get(index)
    }
}

impl PartialEq for CompositeValue {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.short_form == other.descriptor.short_form && self.values == other.values
    }
}

impl fmt::Display for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attribute::{Attribute, AttributeType};

    fn id_boolean_pair() -> Arc<CompositeDescriptor> {
        CompositeDescriptor::new(
            "IdBooleanPair",
            0x2001,
            None,
            vec![
                FieldDescriptor::new(
                    "id",
                    TypeSignature::Attribute(AttributeType::Identifier),
                    false,
                ),
                FieldDescriptor::new(
                    "value",
                    TypeSignature::Attribute(AttributeType::Boolean),
                    true,
                ),
            ],
        )
    }

    #[test]
    fn test_instantiate_checks_arity() {
        let desc = id_boolean_pair();
        let err = desc
            .instantiate(vec![Element::Attribute(Attribute::Identifier(
                "TOTO".into(),
            ))])
            .unwrap_err();
        assert!(matches!(err, Error::FieldCountMismatch { .. }));
    }

    #[test]
    fn test_instantiate_checks_field_types() {
        let desc = id_boolean_pair();
        let err = desc
            .instantiate(vec![
                Element::Attribute(Attribute::Identifier("TOTO".into())),
                Element::Attribute(Attribute::UOctet(1)),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::FieldTypeMismatch { .. }));
    }

    #[test]
    fn test_non_nullable_field_rejects_null() {
        let desc = id_boolean_pair();
        let err = desc
            .instantiate(vec![
                Element::null_of(TypeSignature::Attribute(AttributeType::Identifier)),
                Element::Attribute(Attribute::Boolean(false)),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::FieldNotNullable { .. }));
    }

    #[test]
    fn test_field_access_by_name() {
        let desc = id_boolean_pair();
        let value = desc
            .instantiate(vec![
                Element::Attribute(Attribute::Identifier("TOTO".into())),
                Element::Attribute(Attribute::Boolean(false)),
            ])
            .unwrap();
        assert_eq!(
            value.field("value"),
            Some(&Element::Attribute(Attribute::Boolean(false)))
        );
        assert_eq!(value.field("missing"), None);
    }

    #[test]
    fn test_inheritance_concatenates_fields() {
        let base = id_boolean_pair();
        let derived = CompositeDescriptor::new(
            "StampedIdBooleanPair",
            0x2002,
            Some(Arc::clone(&base)),
            vec![FieldDescriptor::new(
                "stamp",
                TypeSignature::Attribute(AttributeType::Time),
                false,
            )],
        );
        assert_eq!(derived.field_offset(), 2);
        assert_eq!(derived.field_count(), 3);
        let names: Vec<_> = derived.fields().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["id", "value", "stamp"]);
    }
}
