//! MAL message envelope

use bytes::Bytes;

use super::header::MessageHeader;

/// A message envelope: one header plus one encoded body
///
/// This is the unit exchanged between interaction handlers and transports.
/// The body is opaque at this level; the codec gives it meaning.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message header
    header: MessageHeader,
    /// Encoded message body
    body: Bytes,
}

impl Message {
    /// Create a message from a header and an encoded body
    pub fn new(header: MessageHeader, body: impl Into<Bytes>) -> Self {
        Self {
            header,
            body: body.into(),
        }
    }

    /// Get the header
    #[must_use]
    pub const fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Get the encoded body
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// True when the body is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Split into header and body
    #[must_use]
    pub fn into_parts(self) -> (MessageHeader, Bytes) {
        (self.header, self.body)
    }
}
