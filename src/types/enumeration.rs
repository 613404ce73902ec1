//! MAL enumeration types
//!
//! An enumeration is a closed set of named integer values described by an
//! [`EnumDescriptor`]. Values are only created through their descriptor, so
//! an [`EnumValue`] always carries a recognized name.

use std::fmt;
use std::sync::Arc;

use crate::protocol::{Error, Result};

/// One named value of an enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    /// Symbolic name, used on the wire
    pub name: String,
    /// Numeric value
    pub value: u32,
}

/// Type descriptor for an enumeration
#[derive(Debug)]
pub struct EnumDescriptor {
    name: String,
    short_form: i64,
    variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    /// Define an enumeration from `(name, value)` pairs
    pub fn new(
        name: impl Into<String>,
        short_form: i64,
        variants: impl IntoIterator<Item = (&'static str, u32)>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            short_form,
            variants: variants
                .into_iter()
                .map(|(name, value)| EnumVariant {
                    name: name.to_string(),
                    value,
                })
                .collect(),
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

    /// All variants, in declaration order
    #[must_use]
    pub fn variants(&self) -> &[EnumVariant] {
        &self.variants
    }

    /// Value with the given symbolic name
    ///
    /// Unrecognized names fail with a domain error; this is the only path
    /// by which wire literals become enumeration values.
    pub fn value_of(self: &Arc<Self>, name: &str) -> Result<EnumValue> {
        let index = self
            .variants
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| Error::UnknownEnumVariant {
                enumeration: self.name.clone(),
                name: name.to_string(),
            })?;
        Ok(EnumValue {
            descriptor: Arc::clone(self),
            index,
        })
    }

    /// Value with the given numeric value
    pub fn from_value(self: &Arc<Self>, value: u32) -> Result<EnumValue> {
        let index = self
            .variants
            .iter()
            .position(|v| v.value == value)
            .ok_or_else(|| Error::UnknownEnumVariant {
                enumeration: self.name.clone(),
                name: value.to_string(),
            })?;
        Ok(EnumValue {
            descriptor: Arc::clone(self),
            index,
        })
    }
}

/// A value of an enumeration type
#[derive(Debug, Clone)]
pub struct EnumValue {
    descriptor: Arc<EnumDescriptor>,
    index: usize,
}

impl EnumValue {
    /// Descriptor of the enumeration this value belongs to
    #[must_use]
    pub fn descriptor(&self) -> &Arc<EnumDescriptor> {
        &self.descriptor
    }

    /// Symbolic name, used on the wire
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.variants[self.index].name
    }

    /// Numeric value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.descriptor.variants[self.index].value
    }

    /// Short form of the enumeration type
    #[must_use]
    pub fn short_form(&self) -> i64 {
        self.descriptor.short_form
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.short_form == other.descriptor.short_form && self.index == other.index
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn severity() -> Arc<EnumDescriptor> {
        EnumDescriptor::new(
            "Severity",
            0x1001,
            [("INFORMATIONAL", 0), ("WARNING", 1), ("ALARM", 2)],
        )
    }

    #[test]
    fn test_value_lookup_by_name_and_value() {
        let desc = severity();
        let warning = desc.value_of("WARNING").unwrap();
        assert_eq!(warning.value(), 1);
        assert_eq!(warning, desc.from_value(1).unwrap());
        assert_eq!(warning.to_string(), "WARNING");
    }

    #[test]
    fn test_unknown_name_rejected() {
        let desc = severity();
        let err = desc.value_of("CRITICAL").unwrap_err();
        assert!(err.to_string().contains("Severity"));
        assert!(err.to_string().contains("CRITICAL"));
    }
}
