//! Message body codecs
//!
//! A codec maps between a list of typed elements and the opaque byte payload
//! a transport carries. Encoding is self-describing enough to pretty-print;
//! decoding is directed by the caller-supplied type signatures, one per body
//! element. Codecs hold no state across calls and perform no I/O.

mod xml;

use bytes::Bytes;

use crate::protocol::Result;
use crate::types::{Element, TypeSignature};

pub use xml::XmlCodec;

/// Bidirectional mapping between element lists and wire bytes
pub trait Codec: Send + Sync {
    /// Encode a message body
    ///
    /// Never fails on well-formed input; the elements themselves enforce
    /// well-formedness at construction.
    fn encode(&self, body: &[Element]) -> Result<Bytes>;

    /// Decode a message body against the expected signatures
    ///
    /// `signature` carries one entry per expected body element; the decoded
    /// list has exactly that arity or decoding fails with a structural
    /// error.
    fn decode(&self, bytes: &[u8], signature: &[TypeSignature]) -> Result<Vec<Element>>;
}
