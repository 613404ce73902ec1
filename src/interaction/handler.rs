//! Shared interaction machinery
//!
//! Every pattern handler is built from the same parts: a transport handle,
//! a body codec, an operation identity, a `terminated` flag, and the
//! receive-side validation that accepts a message only at the expected
//! stage (or the expected error stage) of the expected operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::codec::Codec;
use crate::protocol::{
    Error, ErrorCode, InteractionType, Message, MessageHeader, QosLevel, Result, SessionType,
};
use crate::transport::Transport;
use crate::types::{Attribute, AttributeType, Element, Time, TypeSignature};

/// Identity of one service operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Service area number
    pub area: u16,
    /// Service number within the area
    pub service: u16,
    /// Operation number within the service
    pub operation: u16,
    /// Version of the area definitions
    pub area_version: u8,
}

impl Operation {
    /// Define an operation identity
    #[must_use]
    pub const fn new(area: u16, service: u16, operation: u16, area_version: u8) -> Self {
        Self {
            area,
            service,
            operation,
            area_version,
        }
    }
}

/// Process-wide transaction id allocator
///
/// Cloning shares the counter; the first allocated id is 1. Handlers take
/// the allocator at construction, so id assignment is explicit and
/// thread-safe rather than hidden global state.
#[derive(Debug, Clone, Default)]
pub struct TransactionIdAllocator {
    next: Arc<AtomicU64>,
}

impl TransactionIdAllocator {
    /// Create an allocator starting at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next transaction id
    #[must_use]
    pub fn allocate(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Addressing and session configuration of a consumer-side handler
#[derive(Debug, Clone)]
pub struct ConsumerEndpoint {
    /// Own identity, used as the originator of every message
    pub consumer: String,
    /// Identity of the provider (or broker, for PubSub) to address
    pub provider: String,
    /// Authentication token
    pub authentication_id: Vec<u8>,
    /// Domain segments
    pub domain: Vec<String>,
    /// Network zone
    pub network_zone: String,
    /// Session kind
    pub session: SessionType,
    /// Session name
    pub session_name: String,
    /// Delivery priority
    pub priority: u32,
    /// Delivery quality of service
    pub qos_level: QosLevel,
    /// Free-form header supplements
    pub supplements: Vec<(String, String)>,
}

impl ConsumerEndpoint {
    /// Endpoint with the given addressing and default session settings
    #[must_use]
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            authentication_id: Vec::new(),
            domain: Vec::new(),
            network_zone: String::new(),
            session: SessionType::default(),
            session_name: String::new(),
            priority: 0,
            qos_level: QosLevel::default(),
            supplements: Vec::new(),
        }
    }
}

/// Addressing and session configuration of a provider-side handler
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    /// Own identity
    pub provider: String,
    /// Broker to address for provider-initiated PubSub traffic
    pub broker: Option<String>,
    /// Authentication token
    pub authentication_id: Vec<u8>,
    /// Domain segments
    pub domain: Vec<String>,
    /// Network zone
    pub network_zone: String,
    /// Session kind
    pub session: SessionType,
    /// Session name
    pub session_name: String,
    /// Delivery priority
    pub priority: u32,
    /// Delivery quality of service
    pub qos_level: QosLevel,
    /// Free-form header supplements
    pub supplements: Vec<(String, String)>,
}

impl ProviderEndpoint {
    /// Endpoint with the given identity and default session settings
    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            broker: None,
            authentication_id: Vec::new(),
            domain: Vec::new(),
            network_zone: String::new(),
            session: SessionType::default(),
            session_name: String::new(),
            priority: 0,
            qos_level: QosLevel::default(),
            supplements: Vec::new(),
        }
    }

    /// Endpoint that addresses provider-initiated traffic to `broker`
    #[must_use]
    pub fn with_broker(provider: impl Into<String>, broker: impl Into<String>) -> Self {
        let mut endpoint = Self::new(provider);
        endpoint.broker = Some(broker.into());
        endpoint
    }
}

/// One accepted message: its header and decoded body
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    /// Header of the accepted message
    pub header: MessageHeader,
    /// Decoded body elements
    pub body: Vec<Element>,
}

/// What a receive operation is willing to accept
#[derive(Debug, Clone, Copy)]
pub(crate) struct Expected {
    /// Handler name, for diagnostics
    pub handler: &'static str,
    /// Interaction pattern the handler serves
    pub interaction: InteractionType,
    /// Stage the handler is waiting for
    pub stage: u8,
    /// Error stage standing in for it, where the pattern defines one
    pub error_stage: Option<u8>,
}

/// Transport, codec, and termination state shared by all handlers
pub(crate) struct HandlerCore {
    transport: Box<dyn Transport>,
    codec: Box<dyn Codec>,
    terminated: bool,
}

impl HandlerCore {
    pub(crate) fn new(transport: Box<dyn Transport>, codec: Box<dyn Codec>) -> Self {
        Self {
            transport,
            codec,
            terminated: false,
        }
    }

    pub(crate) const fn terminated(&self) -> bool {
        self.terminated
    }

    pub(crate) fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Encode a body and hand the envelope to the transport
    pub(crate) fn send_message(&mut self, header: MessageHeader, body: &[Element]) -> Result<()> {
        let encoded = self.codec.encode(body)?;
        debug!(
            to = %header.to,
            interaction = %header.interaction_type,
            stage = header.interaction_stage,
            txn = header.transaction_id,
            error = header.is_error_message,
            "send"
        );
        self.transport.send(&Message::new(header, encoded))
    }

    /// Pull one envelope from the transport
    pub(crate) fn recv_message(&mut self) -> Result<Message> {
        let message = self.transport.recv()?;
        trace!(
            from = %message.header().from,
            interaction = %message.header().interaction_type,
            stage = message.header().interaction_stage,
            txn = message.header().transaction_id,
            "recv"
        );
        Ok(message)
    }

    /// Validate a received envelope and decode its body
    ///
    /// Accepts only the expected `(interaction, stage)` of the handler's own
    /// operation, or the expected error stage; the stage check runs before
    /// any body decoding. An accepted error message terminates the
    /// transaction and surfaces as [`Error::Remote`].
    pub(crate) fn check_and_decode(
        &mut self,
        message: &Message,
        expected: &Expected,
        operation: &Operation,
        signature: &[TypeSignature],
    ) -> Result<Received> {
        let header = message.header();
        let is_expected_stage = !header.is_error_message
            && header.interaction_type == expected.interaction
            && header.interaction_stage == expected.stage;
        let is_expected_error = header.is_error_message
            && header.interaction_type == expected.interaction
            && Some(header.interaction_stage) == expected.error_stage;

        if is_expected_stage {
            check_operation(header, operation)?;
            let body = self.codec.decode(message.body(), signature)?;
            Ok(Received {
                header: header.clone(),
                body,
            })
        } else if is_expected_error {
            self.terminated = true;
            let (code, extra) = self.decode_error_body(message.body())?;
            debug!(code, "peer signalled error");
            Err(Error::Remote { code, extra })
        } else {
            Err(Error::InvalidStage {
                handler: expected.handler,
                expected_type: expected.interaction,
                expected_stage: expected.stage,
                got_type: header.interaction_type,
                got_stage: header.interaction_stage,
            })
        }
    }

    fn decode_error_body(&self, bytes: &[u8]) -> Result<(u32, Option<String>)> {
        let body = self.codec.decode(bytes, &error_signature())?;
        let code = match body.first() {
            Some(Element::Attribute(Attribute::UInteger(code))) => *code,
            _ => ErrorCode::Unknown.as_u32(),
        };
        let extra = match body.get(1) {
            Some(Element::Attribute(Attribute::String(text))) => Some(text.clone()),
            _ => None,
        };
        Ok((code, extra))
    }
}

impl std::fmt::Debug for HandlerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerCore")
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

fn check_operation(header: &MessageHeader, operation: &Operation) -> Result<()> {
    if header.service_area != operation.area {
        return Err(Error::UnsupportedOperation {
            kind: "area",
            code: ErrorCode::UnsupportedArea,
            expected: u32::from(operation.area),
            got: u32::from(header.service_area),
        });
    }
    if header.service != operation.service {
        return Err(Error::UnsupportedOperation {
            kind: "service",
            code: ErrorCode::UnsupportedService,
            expected: u32::from(operation.service),
            got: u32::from(header.service),
        });
    }
    if header.operation != operation.operation {
        return Err(Error::UnsupportedOperation {
            kind: "operation",
            code: ErrorCode::UnsupportedOperation,
            expected: u32::from(operation.operation),
            got: u32::from(header.operation),
        });
    }
    if header.area_version != operation.area_version {
        return Err(Error::UnsupportedOperation {
            kind: "area version",
            code: ErrorCode::UnsupportedAreaVersion,
            expected: u32::from(operation.area_version),
            got: u32::from(header.area_version),
        });
    }
    Ok(())
}

/// Standard error body: the error number plus optional extra information
pub(crate) fn error_body(code: u32, extra: Option<String>) -> Vec<Element> {
    vec![
        Element::Attribute(Attribute::UInteger(code)),
        match extra {
            Some(text) => Element::Attribute(Attribute::String(text)),
            None => Element::null_of(TypeSignature::Attribute(AttributeType::String)),
        },
    ]
}

pub(crate) fn error_signature() -> [TypeSignature; 2] {
    [
        TypeSignature::Attribute(AttributeType::UInteger),
        TypeSignature::Attribute(AttributeType::String),
    ]
}

/// Consumer-side base: fresh headers from configured addressing
#[derive(Debug)]
pub(crate) struct Consumer {
    pub core: HandlerCore,
    pub operation: Operation,
    pub endpoint: ConsumerEndpoint,
    pub transaction_id: u64,
}

impl Consumer {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        codec: Box<dyn Codec>,
        operation: Operation,
        endpoint: ConsumerEndpoint,
        transactions: &TransactionIdAllocator,
    ) -> Self {
        Self {
            core: HandlerCore::new(transport, codec),
            operation,
            endpoint,
            transaction_id: transactions.allocate(),
        }
    }

    /// Build a fresh header for the given stage
    pub(crate) fn header(&self, interaction: InteractionType, stage: u8) -> MessageHeader {
        MessageHeader {
            from: self.endpoint.consumer.clone(),
            to: self.endpoint.provider.clone(),
            authentication_id: self.endpoint.authentication_id.clone(),
            timestamp: Time::now(),
            interaction_type: interaction,
            interaction_stage: stage,
            transaction_id: self.transaction_id,
            service_area: self.operation.area,
            service: self.operation.service,
            operation: self.operation.operation,
            area_version: self.operation.area_version,
            is_error_message: false,
            session: self.endpoint.session,
            session_name: self.endpoint.session_name.clone(),
            priority: self.endpoint.priority,
            domain: self.endpoint.domain.clone(),
            network_zone: self.endpoint.network_zone.clone(),
            qos_level: self.endpoint.qos_level,
            supplements: self.endpoint.supplements.clone(),
        }
    }

    /// Receive, validate, and decode one message
    pub(crate) fn receive(
        &mut self,
        expected: &Expected,
        signature: &[TypeSignature],
    ) -> Result<Received> {
        let message = self.core.recv_message()?;
        self.core
            .check_and_decode(&message, expected, &self.operation, signature)
    }
}

/// Provider-side base: response headers derived from the received message
#[derive(Debug)]
pub(crate) struct Provider {
    pub core: HandlerCore,
    pub operation: Operation,
    pub endpoint: ProviderEndpoint,
    pub transaction_id: u64,
    response_header: Option<MessageHeader>,
}

impl Provider {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        codec: Box<dyn Codec>,
        operation: Operation,
        endpoint: ProviderEndpoint,
        transactions: &TransactionIdAllocator,
    ) -> Self {
        Self {
            core: HandlerCore::new(transport, codec),
            operation,
            endpoint,
            transaction_id: transactions.allocate(),
            response_header: None,
        }
    }

    /// Remember the message being answered
    pub(crate) fn adopt(&mut self, header: &MessageHeader) {
        self.response_header = Some(header.clone());
    }

    /// Header answering the adopted message at the given stage
    pub(crate) fn reply_header(&self, stage: u8, is_error: bool) -> Result<MessageHeader> {
        let adopted = self.response_header.as_ref().ok_or(Error::NoTransaction)?;
        Ok(adopted.reply(stage, is_error))
    }

    /// Fresh header for provider-initiated traffic, addressed to the broker
    pub(crate) fn fresh_header(&self, interaction: InteractionType, stage: u8) -> MessageHeader {
        MessageHeader {
            from: self.endpoint.provider.clone(),
            to: self.endpoint.broker.clone().unwrap_or_default(),
            authentication_id: self.endpoint.authentication_id.clone(),
            timestamp: Time::now(),
            interaction_type: interaction,
            interaction_stage: stage,
            transaction_id: self.transaction_id,
            service_area: self.operation.area,
            service: self.operation.service,
            operation: self.operation.operation,
            area_version: self.operation.area_version,
            is_error_message: false,
            session: self.endpoint.session,
            session_name: self.endpoint.session_name.clone(),
            priority: self.endpoint.priority,
            domain: self.endpoint.domain.clone(),
            network_zone: self.endpoint.network_zone.clone(),
            qos_level: self.endpoint.qos_level,
            supplements: self.endpoint.supplements.clone(),
        }
    }

    /// Receive, validate, and decode one message, adopting its header
    pub(crate) fn receive(
        &mut self,
        expected: &Expected,
        signature: &[TypeSignature],
    ) -> Result<Received> {
        let message = self.core.recv_message()?;
        // Adopt before validation so a stage violation can still be answered
        // with an error envelope on the same transaction.
        self.adopt(message.header());
        self.core
            .check_and_decode(&message, expected, &self.operation, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_starts_at_one_and_is_shared() {
        let allocator = TransactionIdAllocator::new();
        let clone = allocator.clone();
        assert_eq!(allocator.allocate(), 1);
        assert_eq!(clone.allocate(), 2);
        assert_eq!(allocator.allocate(), 3);
    }

    #[test]
    fn test_error_body_shape() {
        let body = error_body(ErrorCode::TooMany.as_u32(), Some("queue full".into()));
        assert_eq!(body.len(), 2);
        assert_eq!(
            body[0],
            Element::Attribute(Attribute::UInteger(ErrorCode::TooMany.as_u32()))
        );
        let no_extra = error_body(ErrorCode::Internal.as_u32(), None);
        assert!(no_extra[1].is_null());
    }
}
