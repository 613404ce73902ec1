//! MAL element type model
//!
//! The closed hierarchy of wire-representable data types: scalar attributes,
//! enumerations, composites, and their list forms, each identified by a
//! signed short form that is unique within its defining area. Values are
//! immutable after construction; the matching [`TypeSignature`] identities
//! drive the codec's decode dispatch.

mod attribute;
mod composite;
mod element;
mod enumeration;
mod list;
mod registry;
mod time;

pub use attribute::{ATTRIBUTE_TYPES, Attribute, AttributeType};
pub use composite::{CompositeDescriptor, CompositeValue, FieldDescriptor};
pub use element::{Element, TypeSignature};
pub use enumeration::{EnumDescriptor, EnumValue, EnumVariant};
pub use list::ElementList;
pub use registry::TypeRegistry;
pub use time::{FineTime, Time};

/// Number of the MAL area itself
pub const MAL_AREA: u16 = 1;

/// Version of the MAL area definitions
pub const MAL_AREA_VERSION: u8 = 1;
