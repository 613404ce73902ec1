//! MAL error types
//!
//! One enum covers the whole taxonomy: structural decode failures, domain
//! violations at element construction, protocol stage violations, remote
//! error messages, and transport failures. [`Error::Remote`] and
//! [`Error::InvalidStage`] are expected protocol outcomes a caller can
//! recover from; the remaining variants indicate local misuse or broken wire
//! data and terminate the transaction.

use thiserror::Error;

use super::types::{ErrorCode, InteractionType};

/// MAL protocol errors
#[derive(Error, Debug)]
pub enum Error {
    /// Wire document cannot be parsed at all
    #[error("malformed wire document: {0}")]
    MalformedDocument(String),

    /// An element node has a name the signature does not allow
    #[error("unexpected element <{got}>: expected <{expected}>")]
    UnexpectedElement {
        /// Name required by the signature
        expected: String,
        /// Name found on the wire
        got: String,
    },

    /// An element node has the wrong number of children for its kind
    #[error("element <{element}> has {got} children, expected {expected}")]
    UnexpectedChildCount {
        /// Offending element name
        element: String,
        /// Child count required by the signature
        expected: usize,
        /// Child count found on the wire
        got: usize,
    },

    /// A childless element lacks the nil marker that would make it a null
    #[error("element <{element}> is empty but carries no nil marker")]
    MissingNilMarker {
        /// Offending element name
        element: String,
    },

    /// A concrete attribute type name on the wire is not known
    #[error("unknown attribute type: {name}")]
    UnknownAttributeType {
        /// Name found on the wire
        name: String,
    },

    /// An enumeration literal does not name any variant
    #[error("unknown {enumeration} variant: {name}")]
    UnknownEnumVariant {
        /// Enumeration type name
        enumeration: String,
        /// Literal found on the wire
        name: String,
    },

    /// A scalar literal does not parse under its type's textual rule
    #[error("malformed {attribute} literal: {text:?}")]
    MalformedLiteral {
        /// Attribute type name
        attribute: &'static str,
        /// Literal found on the wire
        text: String,
    },

    /// Numeric attribute constructed outside its declared range
    #[error("{attribute} value {value} outside range {min}..={max}")]
    OutOfRange {
        /// Attribute type name
        attribute: &'static str,
        /// Rejected value
        value: i128,
        /// Lower bound of the domain
        min: i128,
        /// Upper bound of the domain
        max: i128,
    },

    /// Composite constructed with the wrong number of field values
    #[error("{composite} takes {expected} fields, got {got}")]
    FieldCountMismatch {
        /// Composite type name
        composite: String,
        /// Declared arity
        expected: usize,
        /// Supplied value count
        got: usize,
    },

    /// Composite field assigned a value of the wrong type
    #[error("field {field} of {composite}: expected {expected}, got {got}")]
    FieldTypeMismatch {
        /// Composite type name
        composite: String,
        /// Field name
        field: String,
        /// Declared field type
        expected: String,
        /// Supplied value type
        got: String,
    },

    /// Null assigned to a field declared non-nullable
    #[error("field {field} of {composite} cannot be null")]
    FieldNotNullable {
        /// Composite type name
        composite: String,
        /// Field name
        field: String,
    },

    /// List item of a type other than the list's item type
    #[error("list of {expected} cannot hold {got}")]
    ListItemMismatch {
        /// Declared item type
        expected: String,
        /// Supplied item type
        got: String,
    },

    /// Short form with no registered type
    #[error("unknown short form: {0}")]
    UnknownShortForm(i64),

    /// Short form registered twice
    #[error("short form {0} already registered")]
    DuplicateShortForm(i64),

    /// Received message does not match any stage the handler accepts
    #[error(
        "in {handler}: expected {expected_type}:{expected_stage}, got {got_type}:{got_stage}"
    )]
    InvalidStage {
        /// Handler that rejected the message
        handler: &'static str,
        /// Interaction type the handler serves
        expected_type: InteractionType,
        /// Stage the handler was waiting for
        expected_stage: u8,
        /// Interaction type found in the header
        got_type: InteractionType,
        /// Stage found in the header
        got_stage: u8,
    },

    /// Received message targets a different operation than the handler's
    #[error("{code}: expected {kind} {expected}, got {got}")]
    UnsupportedOperation {
        /// Which identity component mismatched
        kind: &'static str,
        /// Matching MAL standard error number
        code: ErrorCode,
        /// Handler's own value
        expected: u32,
        /// Value found in the header
        got: u32,
    },

    /// Reply attempted before any request was received
    #[error("no transaction in progress: receive a message before replying")]
    NoTransaction,

    /// Notify attempted toward an identity with no live registration
    #[error("no registration for subscriber {subscriber}")]
    UnknownSubscriber {
        /// Subscriber identity
        subscriber: String,
    },

    /// Peer reported an error at this pattern's designated error stage
    #[error("peer error [{code}]{}", display_remote(.code, .extra))]
    Remote {
        /// Error number decoded from the body
        code: u32,
        /// Optional extra information decoded from the body
        extra: Option<String>,
    },

    /// Required out-of-band header field absent
    #[error("missing header field: {name}")]
    MissingHeaderField {
        /// Field name
        name: String,
    },

    /// Out-of-band header field present but unreadable
    #[error("malformed header field {name}: {value:?}")]
    MalformedHeaderField {
        /// Field name
        name: String,
        /// Rejected value
        value: String,
    },

    /// Transport-level failure outside std::io
    #[error("transport error: {0}")]
    Transport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_remote(code: &u32, extra: &Option<String>) -> String {
    let mut out = match ErrorCode::from_u32(*code) {
        Some(known) => format!(" {known}"),
        None => String::new(),
    };
    if let Some(extra) = extra {
        out.push(' ');
        out.push_str(extra);
    }
    out
}

impl Error {
    /// MAL standard error number for this failure, where one applies
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::UnsupportedOperation { code, .. } => Some(*code),
            Self::Remote { code, .. } => ErrorCode::from_u32(*code),
            Self::MalformedDocument(_)
            | Self::UnexpectedElement { .. }
            | Self::UnexpectedChildCount { .. }
            | Self::MissingNilMarker { .. }
            | Self::UnknownAttributeType { .. }
            | Self::UnknownEnumVariant { .. }
            | Self::MalformedLiteral { .. } => Some(ErrorCode::BadEncoding),
            Self::InvalidStage { .. } => Some(ErrorCode::IncorrectState),
            Self::Io(_) | Self::Transport(_) => Some(ErrorCode::DeliveryFailed),
            _ => None,
        }
    }

    /// True when the peer explicitly signalled this error
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::stage;

    #[test]
    fn test_invalid_stage_names_both_sides() {
        let err = Error::InvalidStage {
            handler: "SubmitProvider",
            expected_type: InteractionType::Submit,
            expected_stage: stage::SUBMIT,
            got_type: InteractionType::Request,
            got_stage: stage::REQUEST,
        };
        let text = err.to_string();
        assert!(text.contains("SUBMIT:1"));
        assert!(text.contains("REQUEST:1"));
    }

    #[test]
    fn test_remote_display_names_known_codes() {
        let err = Error::Remote {
            code: ErrorCode::TooMany.as_u32(),
            extra: Some("queue full".into()),
        };
        let text = err.to_string();
        assert!(text.contains("TOO_MANY"));
        assert!(text.contains("queue full"));
        assert!(err.is_remote());
    }

    #[test]
    fn test_decode_errors_map_to_bad_encoding() {
        let err = Error::MissingNilMarker {
            element: "value".into(),
        };
        assert_eq!(err.error_code(), Some(ErrorCode::BadEncoding));
    }
}
