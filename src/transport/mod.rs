//! Message transports
//!
//! A transport is a whole-message byte channel: framing, addressing, and
//! delivery are its business and invisible to the interaction layer. `send`
//! returns once the envelope is handed to the wire; `recv` blocks until one
//! full envelope is available. Timeouts, reconnection, and retransmission
//! are transport concerns; the protocol core never retries.

mod memory;
mod tcp;

use crate::protocol::{Message, Result};

pub use memory::MemoryTransport;
pub use tcp::{TcpAcceptor, TcpTransport};

/// A whole-message channel between two MAL endpoints
pub trait Transport: Send {
    /// Send one envelope
    fn send(&mut self, message: &Message) -> Result<()>;

    /// Receive one envelope, blocking until it is complete
    fn recv(&mut self) -> Result<Message>;

    /// Close the channel
    fn close(&mut self) -> Result<()>;
}
