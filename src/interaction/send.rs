//! Send pattern: fire-and-forget
//!
//! One message, consumer to provider, no reply of any kind. Both sides are
//! terminated after their single operation.

use crate::codec::Codec;
use crate::protocol::{InteractionType, Result, stage};
use crate::transport::Transport;
use crate::types::{Element, TypeSignature};

use super::handler::{
    Consumer, ConsumerEndpoint, Expected, Operation, Provider, ProviderEndpoint, Received,
    TransactionIdAllocator,
};

/// Consumer side of a Send operation
#[derive(Debug)]
pub struct SendConsumer {
    inner: Consumer,
}

impl SendConsumer {
    /// Create a handler for one Send transaction
    #[must_use]
    pub fn new(
        transport: Box<dyn Transport>,
        codec: Box<dyn Codec>,
        operation: Operation,
        endpoint: ConsumerEndpoint,
        transactions: &TransactionIdAllocator,
    ) -> Self {
        Self {
            inner: Consumer::new(transport, codec, operation, endpoint, transactions),
        }
    }

    /// Send the message; the interaction is over once it is on the wire
    pub fn send(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.header(InteractionType::Send, stage::SEND);
        self.inner.core.send_message(header, body)?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Transaction id of this interaction
    #[must_use]
    pub const fn transaction_id(&self) -> u64 {
        self.inner.transaction_id
    }

    /// True once the interaction reached a terminal state
    #[must_use]
    pub const fn terminated(&self) -> bool {
        self.inner.core.terminated()
    }
}

/// Provider side of a Send operation
#[derive(Debug)]
pub struct SendProvider {
    inner: Provider,
}

impl SendProvider {
    /// Create a handler for one Send transaction
    #[must_use]
    pub fn new(
        transport: Box<dyn Transport>,
        codec: Box<dyn Codec>,
        operation: Operation,
        endpoint: ProviderEndpoint,
        transactions: &TransactionIdAllocator,
    ) -> Self {
        Self {
            inner: Provider::new(transport, codec, operation, endpoint, transactions),
        }
    }

    /// Receive the message; the interaction is over once it is accepted
    pub fn receive_send(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        let received = self.inner.receive(
            &Expected {
                handler: "SendProvider",
                interaction: InteractionType::Send,
                stage: stage::SEND,
                error_stage: None,
            },
            signature,
        )?;
        self.inner.core.terminate();
        Ok(received)
    }

    /// True once the interaction reached a terminal state
    #[must_use]
    pub const fn terminated(&self) -> bool {
        self.inner.core.terminated()
    }
}
