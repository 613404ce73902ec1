//! MAL (Message Abstraction Layer) - CCSDS MO interaction patterns over pluggable transports
//!
//! This library implements the transport-agnostic core of the CCSDS Mission
//! Operations Message Abstraction Layer: the six interaction patterns
//! (Send, Submit, Request, Invoke, Progress, PubSub) as per-transaction
//! state machines, and the typed element model with its self-describing
//! MAL/XML codec.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mal::codec::XmlCodec;
//! use mal::interaction::{
//!     ConsumerEndpoint, Operation, RequestConsumer, TransactionIdAllocator,
//! };
//! use mal::transport::TcpTransport;
//! use mal::types::{Attribute, AttributeType, Element, TypeSignature};
//!
//! let transport = TcpTransport::connect("127.0.0.1:9700")?;
//! let transactions = TransactionIdAllocator::new();
//! let mut consumer = RequestConsumer::new(
//!     Box::new(transport),
//!     Box::new(XmlCodec::new()),
//!     Operation::new(4, 2, 2, 1),
//!     ConsumerEndpoint::new("consumer", "provider"),
//!     &transactions,
//! );
//!
//! consumer.request(&[Element::Attribute(Attribute::Identifier("PARAM-1".into()))])?;
//! let response =
//!     consumer.receive_response(&[TypeSignature::Attribute(AttributeType::Double)])?;
//! # Ok::<(), mal::Error>(())
//! ```
//!
//! # Structure
//!
//! - [`types`] - the closed element hierarchy: attributes, enumerations,
//!   composites, lists, and the short-form registry
//! - [`codec`] - the [`codec::Codec`] seam and the MAL/XML wire format
//! - [`protocol`] - message header, envelope, stage tables, and errors
//! - [`interaction`] - the per-pattern consumer/provider/broker handlers
//! - [`transport`] - the byte-channel contract plus TCP and in-memory
//!   implementations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod codec;
pub mod interaction;
pub mod protocol;
pub mod transport;
pub mod types;

pub use protocol::{Error, ErrorCode, InteractionType, Message, MessageHeader, Result};

/// MAL protocol version implemented by this crate
pub const VERSION: &str = "1.0.0-draft";

/// Default MAL TCP port
pub const DEFAULT_PORT: u16 = 9700;
