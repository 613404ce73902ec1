//! Request pattern: single request, single response
//!
//! Consumer requests, provider responds with a payload or an error; either
//! reply terminates the transaction on both sides.

use crate::codec::Codec;
use crate::protocol::{InteractionType, Result, stage};
use crate::transport::Transport;
use crate::types::{Element, TypeSignature};

use super::handler::{
    Consumer, ConsumerEndpoint, Expected, Operation, Provider, ProviderEndpoint, Received,
    TransactionIdAllocator, error_body,
};

/// Consumer side of a Request operation
#[derive(Debug)]
pub struct RequestConsumer {
    inner: Consumer,
}

impl RequestConsumer {
    /// Create a handler for one Request transaction
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

    /// Send the request
    pub fn request(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.header(InteractionType::Request, stage::REQUEST);
        self.inner.core.send_message(header, body)
    }

    /// Receive the response (or the provider's error)
    pub fn receive_response(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        let received = self.inner.receive(
            &Expected {
                handler: "RequestConsumer",
                interaction: InteractionType::Request,
                stage: stage::REQUEST_RESPONSE,
                error_stage: Some(stage::REQUEST_ERROR),
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

/// Provider side of a Request operation
#[derive(Debug)]
pub struct RequestProvider {
    inner: Provider,
}

impl RequestProvider {
    /// Create a handler for one Request transaction
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

    /// Receive the request
    pub fn receive_request(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "RequestProvider",
                interaction: InteractionType::Request,
                stage: stage::REQUEST,
                error_stage: None,
            },
            signature,
        )
    }

    /// Send the response
    pub fn response(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.reply_header(stage::REQUEST_RESPONSE, false)?;
        self.inner.core.send_message(header, body)?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Reject the request with an error number
    pub fn error(&mut self, code: u32, extra: Option<String>) -> Result<()> {
        let header = self.inner.reply_header(stage::REQUEST_ERROR, true)?;
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
