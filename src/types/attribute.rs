//! MAL attribute types
//!
//! The 18 concrete scalar types of the MAL data model, their short forms,
//! and the textual wire rules their values encode with.

use std::fmt;

use crate::protocol::{Error, Result};

use super::time::{FineTime, Time};

/// Type identity of a concrete attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum AttributeType {
    /// Variable-length octet array
    Blob = 1,
    /// `True` or `False`
    Boolean = 2,
    /// Length of time in seconds, possibly fractional
    Duration = 3,
    /// IEEE 754 32-bit float
    Float = 4,
    /// IEEE 754 64-bit float
    Double = 5,
    /// Unicode string usable for indexing
    Identifier = 6,
    /// 8-bit signed integer
    Octet = 7,
    /// 8-bit unsigned integer
    UOctet = 8,
    /// 16-bit signed integer
    Short = 9,
    /// 16-bit unsigned integer
    UShort = 10,
    /// 32-bit signed integer
    Integer = 11,
    /// 32-bit unsigned integer
    UInteger = 12,
    /// 64-bit signed integer
    Long = 13,
    /// 64-bit unsigned integer
    ULong = 14,
    /// Unicode string
    String = 15,
    /// Absolute time, millisecond resolution
    Time = 16,
    /// Absolute time, nanosecond resolution
    FineTime = 17,
    /// URI string
    Uri = 18,
}

/// All attribute types, in short-form order
pub const ATTRIBUTE_TYPES: [AttributeType; 18] = [
    AttributeType::Blob,
    AttributeType::Boolean,
    AttributeType::Duration,
    AttributeType::Float,
    AttributeType::Double,
    AttributeType::Identifier,
    AttributeType::Octet,
    AttributeType::UOctet,
    AttributeType::Short,
    AttributeType::UShort,
    AttributeType::Integer,
    AttributeType::UInteger,
    AttributeType::Long,
    AttributeType::ULong,
    AttributeType::String,
    AttributeType::Time,
    AttributeType::FineTime,
    AttributeType::Uri,
];

impl AttributeType {
    /// Short form identifying this type within the MAL area
    #[must_use]
    pub const fn short_form(self) -> i64 {
        self as i64
    }

    /// Type name, as used for wire element nodes
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blob => "Blob",
            Self::Boolean => "Boolean",
            Self::Duration => "Duration",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Identifier => "Identifier",
            Self::Octet => "Octet",
            Self::UOctet => "UOctet",
            Self::Short => "Short",
            Self::UShort => "UShort",
            Self::Integer => "Integer",
            Self::UInteger => "UInteger",
            Self::Long => "Long",
            Self::ULong => "ULong",
            Self::String => "String",
            Self::Time => "Time",
            Self::FineTime => "FineTime",
            Self::Uri => "URI",
        }
    }

    /// Resolve a wire node name back to the type
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ATTRIBUTE_TYPES.into_iter().find(|ty| ty.name() == name)
    }

    /// Resolve a short form back to the type
    #[must_use]
    pub fn from_short_form(short_form: i64) -> Option<Self> {
        ATTRIBUTE_TYPES
            .into_iter()
            .find(|ty| ty.short_form() == short_form)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A concrete attribute value
///
/// Construction through the checked constructors enforces each type's value
/// domain; a constructed value is immutable.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Binary object, hex on the wire
    Blob(Vec<u8>),
    /// `True` or `False` on the wire
    Boolean(bool),
    /// Seconds, possibly fractional
    Duration(f64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Identifier string
    Identifier(String),
    /// 8-bit signed integer
    Octet(i8),
    /// 8-bit unsigned integer
    UOctet(u8),
    /// 16-bit signed integer
    Short(i16),
    /// 16-bit unsigned integer
    UShort(u16),
    /// 32-bit signed integer
    Integer(i32),
    /// 32-bit unsigned integer
    UInteger(u32),
    /// 64-bit signed integer
    Long(i64),
    /// 64-bit unsigned integer
    ULong(u64),
    /// Unicode string
    String(String),
    /// Millisecond-resolution absolute time
    Time(Time),
    /// Nanosecond-resolution absolute time
    FineTime(FineTime),
    /// URI string
    Uri(String),
}

macro_rules! checked_int_ctor {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(value: i128) -> Result<Self> {
            match <$ty>::try_from(value) {
                Ok(v) => Ok(Self::$variant(v)),
                Err(_) => Err(Error::OutOfRange {
                    attribute: AttributeType::$variant.name(),
                    value,
                    min: <$ty>::MIN as i128,
                    max: <$ty>::MAX as i128,
                }),
            }
        }
    };
}

impl Attribute {
    checked_int_ctor!(
        /// 8-bit signed integer, range -128..=127
        octet,
        Octet,
        i8
    );
    checked_int_ctor!(
        /// 8-bit unsigned integer, range 0..=255
        uoctet,
        UOctet,
        u8
    );
    checked_int_ctor!(
        /// 16-bit signed integer, range -32768..=32767
        short,
        Short,
        i16
    );
    checked_int_ctor!(
        /// 16-bit unsigned integer, range 0..=65535
        ushort,
        UShort,
        u16
    );
    checked_int_ctor!(
        /// 32-bit signed integer
        integer,
        Integer,
        i32
    );
    checked_int_ctor!(
        /// 32-bit unsigned integer
        uinteger,
        UInteger,
        u32
    );
    checked_int_ctor!(
        /// 64-bit signed integer
        long,
        Long,
        i64
    );
    checked_int_ctor!(
        /// 64-bit unsigned integer
        ulong,
        ULong,
        u64
    );

    /// Type identity of this value
    #[must_use]
    pub const fn attribute_type(&self) -> AttributeType {
        match self {
            Self::Blob(_) => AttributeType::Blob,
            Self::Boolean(_) => AttributeType::Boolean,
            Self::Duration(_) => AttributeType::Duration,
            Self::Float(_) => AttributeType::Float,
            Self::Double(_) => AttributeType::Double,
            Self::Identifier(_) => AttributeType::Identifier,
            Self::Octet(_) => AttributeType::Octet,
            Self::UOctet(_) => AttributeType::UOctet,
            Self::Short(_) => AttributeType::Short,
            Self::UShort(_) => AttributeType::UShort,
            Self::Integer(_) => AttributeType::Integer,
            Self::UInteger(_) => AttributeType::UInteger,
            Self::Long(_) => AttributeType::Long,
            Self::ULong(_) => AttributeType::ULong,
            Self::String(_) => AttributeType::String,
            Self::Time(_) => AttributeType::Time,
            Self::FineTime(_) => AttributeType::FineTime,
            Self::Uri(_) => AttributeType::Uri,
        }
    }

    /// Wire literal for this value, per the type's textual rule
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            Self::Blob(bytes) => hex::encode(bytes),
            Self::Boolean(true) => String::from("True"),
            Self::Boolean(false) => String::from("False"),
            Self::Duration(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::Identifier(v) | Self::String(v) | Self::Uri(v) => v.clone(),
            Self::Octet(v) => v.to_string(),
            Self::UOctet(v) => v.to_string(),
            Self::Short(v) => v.to_string(),
            Self::UShort(v) => v.to_string(),
            Self::Integer(v) => v.to_string(),
            Self::UInteger(v) => v.to_string(),
            Self::Long(v) => v.to_string(),
            Self::ULong(v) => v.to_string(),
            Self::Time(v) => v.format(),
            Self::FineTime(v) => v.format(),
        }
    }

    /// Parse a wire literal into a value of the given type
    ///
    /// Inverts [`Attribute::format`] bit-for-bit for every type.
    pub fn parse(ty: AttributeType, text: &str) -> Result<Self> {
        let malformed = || Error::MalformedLiteral {
            attribute: ty.name(),
            text: text.to_string(),
        };
        match ty {
            AttributeType::Blob => hex::decode(text).map(Self::Blob).map_err(|_| malformed()),
            AttributeType::Boolean => match text {
                "True" => Ok(Self::Boolean(true)),
                "False" => Ok(Self::Boolean(false)),
                _ => Err(malformed()),
            },
            AttributeType::Duration => text.parse().map(Self::Duration).map_err(|_| malformed()),
            AttributeType::Float => text.parse().map(Self::Float).map_err(|_| malformed()),
            AttributeType::Double => text.parse().map(Self::Double).map_err(|_| malformed()),
            AttributeType::Identifier => Ok(Self::Identifier(text.to_string())),
            AttributeType::Octet => text.parse().map(Self::Octet).map_err(|_| malformed()),
            AttributeType::UOctet => text.parse().map(Self::UOctet).map_err(|_| malformed()),
            AttributeType::Short => text.parse().map(Self::Short).map_err(|_| malformed()),
            AttributeType::UShort => text.parse().map(Self::UShort).map_err(|_| malformed()),
            AttributeType::Integer => text.parse().map(Self::Integer).map_err(|_| malformed()),
            AttributeType::UInteger => text.parse().map(Self::UInteger).map_err(|_| malformed()),
            AttributeType::Long => text.parse().map(Self::Long).map_err(|_| malformed()),
            AttributeType::ULong => text.parse().map(Self::ULong).map_err(|_| malformed()),
            AttributeType::String => Ok(Self::String(text.to_string())),
            AttributeType::Time => Time::parse(text).map(Self::Time),
            AttributeType::FineTime => FineTime::parse(text).map(Self::FineTime),
            AttributeType::Uri => Ok(Self::Uri(text.to_string())),
        }
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Time> for Attribute {
    fn from(value: Time) -> Self {
        Self::Time(value)
    }
}

impl From<FineTime> for Attribute {
    fn from(value: FineTime) -> Self {
        Self::FineTime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uoctet_range_enforced() {
        assert!(Attribute::uoctet(256).is_err());
        assert_eq!(Attribute::uoctet(255).unwrap(), Attribute::UOctet(255));
        assert!(Attribute::uoctet(-1).is_err());
    }

    #[test]
    fn test_octet_range_enforced() {
        assert!(Attribute::octet(-129).is_err());
        assert_eq!(Attribute::octet(-128).unwrap(), Attribute::Octet(-128));
        assert_eq!(Attribute::octet(127).unwrap(), Attribute::Octet(127));
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(Attribute::Boolean(true).format(), "True");
        assert_eq!(
            Attribute::parse(AttributeType::Boolean, "False").unwrap(),
            Attribute::Boolean(false)
        );
        assert!(Attribute::parse(AttributeType::Boolean, "true").is_err());
    }

    #[test]
    fn test_blob_lowercase_hex() {
        let blob = Attribute::Blob(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(blob.format(), "deadbeef");
        assert_eq!(
            Attribute::parse(AttributeType::Blob, "deadbeef").unwrap(),
            blob
        );
        assert!(Attribute::parse(AttributeType::Blob, "xyz").is_err());
    }

    #[test]
    fn test_numeric_literal_roundtrip_at_bounds() {
        for (attr, literal) in [
            (Attribute::Long(i64::MIN), "-9223372036854775808"),
            (Attribute::Long(i64::MAX), "9223372036854775807"),
            (Attribute::ULong(u64::MAX), "18446744073709551615"),
            (Attribute::Short(i16::MIN), "-32768"),
        ] {
            assert_eq!(attr.format(), literal);
            assert_eq!(
                Attribute::parse(attr.attribute_type(), literal).unwrap(),
                attr
            );
        }
    }

    #[test]
    fn test_type_names_resolve() {
        assert_eq!(AttributeType::from_name("URI"), Some(AttributeType::Uri));
        assert_eq!(
            AttributeType::from_short_form(8),
            Some(AttributeType::UOctet)
        );
        assert_eq!(AttributeType::from_name("Uri"), None);
        for ty in ATTRIBUTE_TYPES {
            assert_eq!(AttributeType::from_short_form(ty.short_form()), Some(ty));
        }
    }
}
