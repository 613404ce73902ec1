//! Progress pattern: acknowledged request with streamed updates
//!
//! The provider acknowledges, streams any number of updates, and closes
//! with a response. Whether a received message is an update or the final
//! response is only known from its header, so the consumer has a single
//! receive operation that inspects the decoded stage and reports which
//! branch applied.

use crate::codec::Codec;
use crate::protocol::{InteractionType, Result, stage};
use crate::transport::Transport;
use crate::types::{Element, TypeSignature};

use super::handler::{
    Consumer, ConsumerEndpoint, Expected, Operation, Provider, ProviderEndpoint, Received,
    TransactionIdAllocator, error_body,
};

/// What a Progress consumer received after the acknowledgement
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// An intermediate update; more will follow
    Update(Received),
    /// The final response; the transaction is terminated
    Response(Received),
}

/// Consumer side of a Progress operation
#[derive(Debug)]
pub struct ProgressConsumer {
    inner: Consumer,
}

impl ProgressConsumer {
    /// Create a handler for one Progress transaction
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

    /// Send the initiating request
    pub fn progress(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.header(InteractionType::Progress, stage::PROGRESS);
        self.inner.core.send_message(header, body)
    }

    /// Receive the acknowledgement (or the provider's early error)
    pub fn receive_ack(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "ProgressConsumer",
                interaction: InteractionType::Progress,
                stage: stage::PROGRESS_ACK,
                error_stage: Some(stage::PROGRESS_ACK_ERROR),
            },
            signature,
        )
    }

    /// Receive the next update or the final response
    ///
    /// `update_signature` decodes PROGRESS_UPDATE bodies,
    /// `response_signature` the PROGRESS_RESPONSE body. Terminates only when
    /// the response (or a response/update error) arrives.
    pub fn receive_update(
        &mut self,
        update_signature: &[TypeSignature],
        response_signature: &[TypeSignature],
    ) -> Result<ProgressEvent> {
        let message = self.inner.core.recv_message()?;
        let arrived = message.header().interaction_stage;
        if arrived == stage::PROGRESS_RESPONSE {
            let received = self.inner.core.check_and_decode(
                &message,
                &Expected {
                    handler: "ProgressConsumer",
                    interaction: InteractionType::Progress,
                    stage: stage::PROGRESS_RESPONSE,
                    error_stage: Some(stage::PROGRESS_RESPONSE_ERROR),
                },
                &self.inner.operation,
                response_signature,
            )?;
            self.inner.core.terminate();
            Ok(ProgressEvent::Response(received))
        } else {
            let received = self.inner.core.check_and_decode(
                &message,
                &Expected {
                    handler: "ProgressConsumer",
                    interaction: InteractionType::Progress,
                    stage: stage::PROGRESS_UPDATE,
                    error_stage: Some(stage::PROGRESS_UPDATE_ERROR),
                },
                &self.inner.operation,
                update_signature,
            )?;
            Ok(ProgressEvent::Update(received))
        }
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

/// Provider side of a Progress operation
#[derive(Debug)]
pub struct ProgressProvider {
    inner: Provider,
}

impl ProgressProvider {
    /// Create a handler for one Progress transaction
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

    /// Receive the initiating request
    pub fn receive_progress(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "ProgressProvider",
                interaction: InteractionType::Progress,
                stage: stage::PROGRESS,
                error_stage: None,
            },
            signature,
        )
    }

    /// Acknowledge the request; the transaction stays open
    pub fn ack(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.reply_header(stage::PROGRESS_ACK, false)?;
        self.inner.core.send_message(header, body)
    }

    /// Reject the request at the acknowledgement stage
    pub fn ack_error(&mut self, code: u32, extra: Option<String>) -> Result<()> {
        let header = self.inner.reply_header(stage::PROGRESS_ACK_ERROR, true)?;
        self.inner.core.send_message(header, &error_body(code, extra))?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Stream one update; the transaction stays open
    pub fn update(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.reply_header(stage::PROGRESS_UPDATE, false)?;
        self.inner.core.send_message(header, body)
    }

    /// Fail the transaction at the update stage
    pub fn update_error(&mut self, code: u32, extra: Option<String>) -> Result<()> {
        let header = self.inner.reply_header(stage::PROGRESS_UPDATE_ERROR, true)?;
        self.inner.core.send_message(header, &error_body(code, extra))?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Close the stream with the final response
    pub fn response(&mut self, body: &[Element]) -> Result<()> {
        let header = self.inner.reply_header(stage::PROGRESS_RESPONSE, false)?;
        self.inner.core.send_message(header, body)?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Fail the transaction at the response stage
    pub fn response_error(&mut self, code: u32, extra: Option<String>) -> Result<()> {
        let header = self
            .inner
            .reply_header(stage::PROGRESS_RESPONSE_ERROR, true)?;
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
