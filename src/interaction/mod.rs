//! MAL interaction state machines
//!
//! One consumer/provider handler pair per interaction pattern (plus
//! publisher and broker roles for PubSub). A handler is scoped to exactly
//! one transaction: it owns a transport handle, a body codec, the
//! transaction id, and the `terminated` flag, and its operations enforce
//! the pattern's legal stage sequence on both the sending and the
//! receiving side.
//!
//! Handlers are not internally synchronized; run one instance per
//! transaction and keep its operations on a single execution context. The
//! [`TransactionIdAllocator`] is the only state shared between handlers and
//! is atomic.

mod handler;
mod invoke;
mod progress;
mod pubsub;
mod request;
mod send;
mod submit;

pub use handler::{
    ConsumerEndpoint, Operation, ProviderEndpoint, Received, TransactionIdAllocator,
};
pub use invoke::{InvokeConsumer, InvokeProvider};
pub use progress::{ProgressConsumer, ProgressEvent, ProgressProvider};
pub use pubsub::{
    PubSubBroker, PubSubConsumer, PubSubPublisher, PublishRegistrationEvent, RegistrationEvent,
};
pub use request::{RequestConsumer, RequestProvider};
pub use send::{SendConsumer, SendProvider};
pub use submit::{SubmitConsumer, SubmitProvider};
