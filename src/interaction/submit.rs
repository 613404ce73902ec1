//! Submit pattern: acknowledged submit
//!
//! Consumer submits, provider acknowledges or signals an error; either
//! reply terminates the transaction on both sides.

use crate::codec::Codec;
use crate::protocol::{InteractionType, Result, stage};
use crate::transport::Transport;
use crate::types::{Element, TypeSignature};

use super::handler::{
    Consumer, ConsumerEndpoint, Expected, Operation, Provider, ProviderEndpoint, Received,
    TransactionIdAllocator, error_body,
};

/// Consumer side of a Submit operation
#[derive(Debug)]
pub struct SubmitConsumer {
    inner: Consumer,
}

impl SubmitConsumer {
    /// Create a handler for one Submit transaction
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

    /// Send the submission
    pub fn submit(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.header(InteractionType::Submit, stage::SUBMIT);
        self.inner.core.send_message(header, body)
    }

    /// Receive the acknowledgement (or the provider's error)
    pub fn receive_ack(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        let received = self.inner.receive(
            &Expected {
                handler: "SubmitConsumer",
                interaction: InteractionType::Submit,
                stage: stage::SUBMIT_ACK,
                error_stage: Some(stage::SUBMIT_ERROR),
            },
            signature,
        )?;
        self.inner.core.terminate();
        Ok(received)
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

/// Provider side of a Submit operation
#[derive(Debug)]
pub struct SubmitProvider {
    inner: Provider,
}

impl SubmitProvider {
    /// Create a handler for one Submit transaction
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

    /// Receive the submission
    pub fn receive_submit(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "SubmitProvider",
                interaction: InteractionType::Submit,
                stage: stage::SUBMIT,
                error_stage: None,
            },
            signature,
        )
    }

    /// Acknowledge the submission
    pub fn ack(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.reply_header(stage::SUBMIT_ACK, false)?;
        self.inner.core.send_message(header, body)?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Reject the submission with an error number
    pub fn error(&mut self, code: u32, extra: Option<String>) -> Result<()> {
        let header = self.inner.reply_header(stage::SUBMIT_ERROR, true)?;
        self.inner.core.send_message(header, &error_body(code, extra))?;
        self.inner.core.terminate();
        Ok(())
    }

    /// True once the interaction reached a terminal state
    #[must_use]
    pub const fn terminated(&self) -> bool {
        self.inner.core.terminated()
    }
}
