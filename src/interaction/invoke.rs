//! Invoke pattern: acknowledged request with deferred response
//!
//! Consumer invokes and is free once the invocation is sent; the provider
//! acknowledges immediately and responds later. An error at the ACK stage
//! terminates the transaction; otherwise the response (or response error)
//! does.

use crate::codec::Codec;
use crate::protocol::{InteractionType, Result, stage};
use crate::transport::Transport;
use crate::types::{Element, TypeSignature};

use super::handler::{
    Consumer, ConsumerEndpoint, Expected, Operation, Provider, ProviderEndpoint, Received,
    TransactionIdAllocator, error_body,
};

/// Consumer side of an Invoke operation
#[derive(Debug)]
pub struct InvokeConsumer {
    inner: Consumer,
}

impl InvokeConsumer {
    /// Create a handler for one Invoke transaction
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

    /// Send the invocation
    pub fn invoke(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.header(InteractionType::Invoke, stage::INVOKE);
        self.inner.core.send_message(header, body)
    }

    /// Receive the acknowledgement (or the provider's early error)
    pub fn receive_ack(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "InvokeConsumer",
                interaction: InteractionType::Invoke,
                stage: stage::INVOKE_ACK,
                error_stage: Some(stage::INVOKE_ACK_ERROR),
            },
            signature,
        )
    }

    /// Receive the deferred response (or the provider's error)
    pub fn receive_response(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        let received = self.inner.receive(
            &Expected {
                handler: "InvokeConsumer",
                interaction: InteractionType::Invoke,
                stage: stage::INVOKE_RESPONSE,
                error_stage: Some(stage::INVOKE_RESPONSE_ERROR),
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

/// Provider side of an Invoke operation
#[derive(Debug)]
pub struct InvokeProvider {
    inner: Provider,
}

impl InvokeProvider {
    /// Create a handler for one Invoke transaction
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

    /// Receive the invocation
    pub fn receive_invoke(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "InvokeProvider",
                interaction: InteractionType::Invoke,
                stage: stage::INVOKE,
                error_stage: None,
            },
            signature,
        )
    }

    /// Acknowledge the invocation; the transaction stays open
    pub fn ack(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.reply_header(stage::INVOKE_ACK, false)?;
        self.inner.core.send_message(header, body)
    }

    /// Reject the invocation at the acknowledgement stage
    pub fn ack_error(&mut self, code: u32, extra: Option<String>) -> Result<()> {
        let header = self.inner.reply_header(stage::INVOKE_ACK_ERROR, true)?;
        self.inner.core.send_message(header, &error_body(code, extra))?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Send the deferred response
    pub fn response(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.reply_header(stage::INVOKE_RESPONSE, false)?;
        self.inner.core.send_message(header, body)?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Fail the transaction at the response stage
    pub fn response_error(&mut self, code: u32, extra: Option<String>) -> Result<()> {
        let header = self.inner.reply_header(stage::INVOKE_RESPONSE_ERROR, true)?;
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
