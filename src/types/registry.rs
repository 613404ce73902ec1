//! Short-form type registry
//!
//! Maps every concrete type's short form to its signature. The registry is
//! built at initialization time, normally by generated service code; the 18
//! MAL attribute types and their list forms are pre-loaded. Registering a
//! composite or enumeration also registers its list form at the negated
//! short form.

use std::collections::HashMap;
use std::sync::Arc;

use crate::protocol::{Error, Result};

use super::attribute::ATTRIBUTE_TYPES;
use super::composite::CompositeDescriptor;
use super::element::TypeSignature;
use super::enumeration::EnumDescriptor;

/// Registry of concrete element types, keyed by short form
#[derive(Debug)]
pub struct TypeRegistry {
    entries: HashMap<i64, TypeSignature>,
}

impl TypeRegistry {
    /// Registry pre-loaded with the MAL attribute types and their lists
    #[must_use]
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        for ty in ATTRIBUTE_TYPES {
            let signature = TypeSignature::Attribute(ty);
            entries.insert(ty.short_form(), signature.clone());
            entries.insert(-ty.short_form(), signature.list_of());
        }
        Self { entries }
    }

    /// Register an enumeration type and its list form
    pub fn register_enum(&mut self, descriptor: Arc<EnumDescriptor>) -> Result<()> {
        let signature = TypeSignature::Enumeration(descriptor);
        self.register(signature)
    }

    /// Register a composite type and its list form
    pub fn register_composite(&mut self, descriptor: Arc<CompositeDescriptor>) -> Result<()> {
        let signature = TypeSignature::Composite(descriptor);
        self.register(signature)
    }

    fn register(&mut self, signature: TypeSignature) -> Result<()> {
        // Signature comes from a descriptor, so the short form is present.
        let short_form = signature.short_form().ok_or(Error::UnknownShortForm(0))?;
        if self.entries.contains_key(&short_form) || self.entries.contains_key(&-short_form) {
            return Err(Error::DuplicateShortForm(short_form));
        }
        self.entries.insert(-short_form, signature.clone().list_of());
        self.entries.insert(short_form, signature);
        Ok(())
    }

    /// Signature registered at the given short form
    pub fn resolve(&self, short_form: i64) -> Result<&TypeSignature> {
        self.entries
            .get(&short_form)
            .ok_or(Error::UnknownShortForm(short_form))
    }

    /// Number of registered signatures, list forms included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attribute::AttributeType;

    #[test]
    fn test_attributes_preloaded() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.len(), 36);
        let sig = registry.resolve(8).unwrap();
        assert_eq!(*sig, TypeSignature::Attribute(AttributeType::UOctet));
        let list = registry.resolve(-8).unwrap();
        assert_eq!(
            *list,
            TypeSignature::Attribute(AttributeType::UOctet).list_of()
        );
    }

    #[test]
    fn test_unknown_short_form() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.resolve(99),
            Err(Error::UnknownShortForm(99))
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = TypeRegistry::new();
        let desc = EnumDescriptor::new("Severity", 0x1001, [("INFO", 0)]);
        registry.register_enum(Arc::clone(&desc)).unwrap();
        assert!(matches!(
            registry.register_enum(desc),
            Err(Error::DuplicateShortForm(0x1001))
        ));
    }

    #[test]
    fn test_list_form_registered_alongside() {
        let mut registry = TypeRegistry::new();
        let desc = EnumDescriptor::new("Severity", 0x1001, [("INFO", 0)]);
        registry.register_enum(desc).unwrap();
        let list = registry.resolve(-0x1001).unwrap();
        assert_eq!(list.type_name(), "SeverityList");
    }
}
