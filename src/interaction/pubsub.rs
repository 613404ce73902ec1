//! PubSub pattern: publish/subscribe through a broker
//!
//! Subscribers register interest with the broker and receive notifications
//! until they deregister; publishers register with the broker and push
//! publications to it. The broker is a superposition of both roles: a
//! provider toward its subscribers and publishers for the registration
//! handshakes, and the originator of notifications. It tracks one reply
//! template per registered identity so a notification can address any live
//! subscriber; deciding *which* subscribers match a publication is the
//! caller's business.

use std::collections::HashMap;

use crate::codec::Codec;
use crate::protocol::{Error, InteractionType, MessageHeader, Result, stage};
use crate::transport::Transport;
use crate::types::{Element, TypeSignature};

use super::handler::{
    Consumer, ConsumerEndpoint, Expected, Operation, Provider, ProviderEndpoint, Received,
    TransactionIdAllocator, error_body,
};

/// Consumer (subscriber) side of a PubSub operation
#[derive(Debug)]
pub struct PubSubConsumer {
    inner: Consumer,
}

impl PubSubConsumer {
    /// Create a handler bound to one broker
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

    /// Register interest with the broker
    pub fn register(&mut self, body: &[Element]) -> Result<()> {
        let header = self
            .inner
            .header(InteractionType::PubSub, stage::PUBSUB_REGISTER);
        self.inner.core.send_message(header, body)
    }

    /// Receive the broker's registration acknowledgement
    pub fn receive_register_ack(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "PubSubConsumer",
                interaction: InteractionType::PubSub,
                stage: stage::PUBSUB_REGISTER_ACK,
                error_stage: Some(stage::PUBSUB_REGISTER_ERROR),
            },
            signature,
        )
    }

    /// Receive one notification
    ///
    /// Notifications repeat until deregistration; receiving one does not
    /// terminate the interaction.
    pub fn receive_notify(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "PubSubConsumer",
                interaction: InteractionType::PubSub,
                stage: stage::PUBSUB_NOTIFY,
                error_stage: Some(stage::PUBSUB_NOTIFY_ERROR),
            },
            signature,
        )
    }

    /// Withdraw the registration
    pub fn deregister(&mut self, body: &[Element]) -> Result<()> {
        let header = self
            .inner
            .header(InteractionType::PubSub, stage::PUBSUB_DEREGISTER);
        self.inner.core.send_message(header, body)
    }

    /// Receive the broker's deregistration acknowledgement
    pub fn receive_deregister_ack(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        let received = self.inner.receive(
            &Expected {
                handler: "PubSubConsumer",
                interaction: InteractionType::PubSub,
                stage: stage::PUBSUB_DEREGISTER_ACK,
                error_stage: Some(stage::PUBSUB_DEREGISTER_ERROR),
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

/// Publisher (provider) side of a PubSub operation
///
/// Publishers initiate traffic toward the broker, so headers are built
/// fresh from the endpoint configuration and the handler's own transaction
/// id rather than derived from a received message.
#[derive(Debug)]
pub struct PubSubPublisher {
    inner: Provider,
}

impl PubSubPublisher {
    /// Create a handler bound to one broker
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

    /// Announce this publisher to the broker
    pub fn publish_register(&mut self, body: &[Element]) -> Result<()> {
        let header = self
            .inner
            .fresh_header(InteractionType::PubSub, stage::PUBSUB_PUBLISH_REGISTER);
        self.inner.core.send_message(header, body)
    }

    /// Receive the broker's publisher-registration acknowledgement
    pub fn receive_publish_register_ack(
        &mut self,
        signature: &[TypeSignature],
    ) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "PubSubPublisher",
                interaction: InteractionType::PubSub,
                stage: stage::PUBSUB_PUBLISH_REGISTER_ACK,
                error_stage: Some(stage::PUBSUB_PUBLISH_REGISTER_ERROR),
            },
            signature,
        )
    }

    /// Push one publication to the broker
    pub fn publish(&mut self, body: &[Element]) -> Result<()> {
        let header = self
            .inner
            .fresh_header(InteractionType::PubSub, stage::PUBSUB_PUBLISH);
        self.inner.core.send_message(header, body)
    }

    /// Receive a broker error for a failed publication
    ///
    /// The only legitimate outcome is [`Error::Remote`]; publications carry
    /// no acknowledgement.
    pub fn receive_publish_error(&mut self) -> Result<Received> {
        self.inner.receive(
            &Expected {
                handler: "PubSubPublisher",
                interaction: InteractionType::PubSub,
                stage: stage::PUBSUB_PUBLISH_ERROR,
                error_stage: Some(stage::PUBSUB_PUBLISH_ERROR),
            },
            &[],
        )
    }

    /// Withdraw this publisher from the broker
    pub fn publish_deregister(&mut self, body: &[Element]) -> Result<()> {
        let header = self
            .inner
            .fresh_header(InteractionType::PubSub, stage::PUBSUB_PUBLISH_DEREGISTER);
        self.inner.core.send_message(header, body)
    }

    /// Receive the broker's publisher-deregistration acknowledgement
    pub fn receive_publish_deregister_ack(
        &mut self,
        signature: &[TypeSignature],
    ) -> Result<Received> {
        let received = self.inner.receive(
            &Expected {
                handler: "PubSubPublisher",
                interaction: InteractionType::PubSub,
                stage: stage::PUBSUB_PUBLISH_DEREGISTER_ACK,
                error_stage: Some(stage::PUBSUB_PUBLISH_DEREGISTER_ERROR),
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

/// A registration-side message the broker accepted
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationEvent {
    /// A subscriber registered
    Register(Received),
    /// A subscriber deregistered
    Deregister(Received),
}

/// A publisher-side registration message the broker accepted
#[derive(Debug, Clone, PartialEq)]
pub enum PublishRegistrationEvent {
    /// A publisher registered
    Register(Received),
    /// A publisher deregistered
    Deregister(Received),
}

/// Broker side of a PubSub operation
#[derive(Debug)]
pub struct PubSubBroker {
    inner: Provider,
    /// Reply template per identity, from the last message it sent us
    reply_templates: HashMap<String, MessageHeader>,
    /// Live subscriber registrations, keyed by subscriber identity
    subscribers: HashMap<String, MessageHeader>,
    /// Live publisher registrations, keyed by publisher identity
    publishers: HashMap<String, MessageHeader>,
}

impl PubSubBroker {
    /// Create a broker handler
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
            reply_templates: HashMap::new(),
            subscribers: HashMap::new(),
            publishers: HashMap::new(),
        }
    }

    /// Identities with a live subscriber registration
    #[must_use]
    pub fn subscribers(&self) -> Vec<&str> {
        self.subscribers.keys().map(String::as_str).collect()
    }

    /// Identities with a live publisher registration
    #[must_use]
    pub fn publishers(&self) -> Vec<&str> {
        self.publishers.keys().map(String::as_str).collect()
    }

    /// Receive a subscriber's register or deregister message
    ///
    /// A register records the subscriber; a deregister removes it, so no
    /// further notification can address it.
    pub fn receive_registration(
        &mut self,
        register_signature: &[TypeSignature],
        deregister_signature: &[TypeSignature],
    ) -> Result<RegistrationEvent> {
        let message = self.inner.core.recv_message()?;
        self.inner.adopt(message.header());
        let from = message.header().from.clone();
        let arrived = message.header().interaction_stage;

        let (expected_stage, error_stage, signature) = if arrived == stage::PUBSUB_DEREGISTER {
            (
                stage::PUBSUB_DEREGISTER,
                stage::PUBSUB_DEREGISTER_ERROR,
                deregister_signature,
            )
        } else {
            (
                stage::PUBSUB_REGISTER,
                stage::PUBSUB_REGISTER_ERROR,
                register_signature,
            )
        };
        let received = self.inner.core.check_and_decode(
            &message,
            &Expected {
                handler: "PubSubBroker",
                interaction: InteractionType::PubSub,
                stage: expected_stage,
                error_stage: Some(error_stage),
            },
            &self.inner.operation,
            signature,
        )?;

        self.reply_templates
            .insert(from.clone(), received.header.clone());
        if expected_stage == stage::PUBSUB_REGISTER {
            self.subscribers.insert(from, received.header.clone());
            Ok(RegistrationEvent::Register(received))
        } else {
            self.subscribers.remove(&from);
            Ok(RegistrationEvent::Deregister(received))
        }
    }

    /// Acknowledge a subscriber's registration
    pub fn register_ack(&mut self, subscriber: &str, body: &[Element]) -> Result<()> {
        let header = self.keyed_reply(subscriber, stage::PUBSUB_REGISTER_ACK, false)?;
        self.inner.core.send_message(header, body)
    }

    /// Reject a subscriber's registration
    pub fn register_error(
        &mut self,
        subscriber: &str,
        code: u32,
        extra: Option<String>,
    ) -> Result<()> {
        let header = self.keyed_reply(subscriber, stage::PUBSUB_REGISTER_ERROR, true)?;
        self.subscribers.remove(subscriber);
        self.inner.core.send_message(header, &error_body(code, extra))
    }

    /// Acknowledge a subscriber's deregistration
    pub fn deregister_ack(&mut self, subscriber: &str, body: &[Element]) -> Result<()> {
        let header = self.keyed_reply(subscriber, stage::PUBSUB_DEREGISTER_ACK, false)?;
        self.subscribers.remove(subscriber);
        self.inner.core.send_message(header, body)
    }

    /// Reject a subscriber's deregistration
    pub fn deregister_error(
        &mut self,
        subscriber: &str,
        code: u32,
        extra: Option<String>,
    ) -> Result<()> {
        let header = self.keyed_reply(subscriber, stage::PUBSUB_DEREGISTER_ERROR, true)?;
        self.inner.core.send_message(header, &error_body(code, extra))
    }

    /// Notify one registered subscriber
    ///
    /// The notification reuses the subscriber's registration transaction,
    /// so the subscriber's `receive_notify` matches it.
    pub fn notify(&mut self, subscriber: &str, body: &[Element]) -> Result<()> {
        let registration =
            self.subscribers
                .get(subscriber)
                .ok_or_else(|| Error::UnknownSubscriber {
                    subscriber: subscriber.to_string(),
                })?;
        let header = registration.reply(stage::PUBSUB_NOTIFY, false);
        self.inner.core.send_message(header, body)
    }

    /// Fail a subscriber's notification stream
    pub fn notify_error(
        &mut self,
        subscriber: &str,
        code: u32,
        extra: Option<String>,
    ) -> Result<()> {
        let registration =
            self.subscribers
                .remove(subscriber)
                .ok_or_else(|| Error::UnknownSubscriber {
                    subscriber: subscriber.to_string(),
                })?;
        let header = registration.reply(stage::PUBSUB_NOTIFY_ERROR, true);
        self.inner.core.send_message(header, &error_body(code, extra))?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Receive a publisher's register or deregister message
    pub fn receive_publish_registration(
        &mut self,
        register_signature: &[TypeSignature],
        deregister_signature: &[TypeSignature],
    ) -> Result<PublishRegistrationEvent> {
        let message = self.inner.core.recv_message()?;
        self.inner.adopt(message.header());
        let from = message.header().from.clone();
        let arrived = message.header().interaction_stage;

        let (expected_stage, error_stage, signature) =
            if arrived == stage::PUBSUB_PUBLISH_DEREGISTER {
                (
                    stage::PUBSUB_PUBLISH_DEREGISTER,
                    stage::PUBSUB_PUBLISH_DEREGISTER_ERROR,
                    deregister_signature,
                )
            } else {
                (
                    stage::PUBSUB_PUBLISH_REGISTER,
                    stage::PUBSUB_PUBLISH_REGISTER_ERROR,
                    register_signature,
                )
            };
        let received = self.inner.core.check_and_decode(
            &message,
            &Expected {
                handler: "PubSubBroker",
                interaction: InteractionType::PubSub,
                stage: expected_stage,
                error_stage: Some(error_stage),
            },
            &self.inner.operation,
            signature,
        )?;

        self.reply_templates
            .insert(from.clone(), received.header.clone());
        if expected_stage == stage::PUBSUB_PUBLISH_REGISTER {
            self.publishers.insert(from, received.header.clone());
            Ok(PublishRegistrationEvent::Register(received))
        } else {
            self.publishers.remove(&from);
            Ok(PublishRegistrationEvent::Deregister(received))
        }
    }

    /// Acknowledge a publisher's registration
    pub fn publish_register_ack(&mut self, publisher: &str, body: &[Element]) -> Result<()> {
        let header = self.keyed_reply(publisher, stage::PUBSUB_PUBLISH_REGISTER_ACK, false)?;
        self.inner.core.send_message(header, body)
    }

    /// Reject a publisher's registration
    pub fn publish_register_error(
        &mut self,
        publisher: &str,
        code: u32,
        extra: Option<String>,
    ) -> Result<()> {
        let header = self.keyed_reply(publisher, stage::PUBSUB_PUBLISH_REGISTER_ERROR, true)?;
        self.publishers.remove(publisher);
        self.inner.core.send_message(header, &error_body(code, extra))?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Acknowledge a publisher's deregistration
    pub fn publish_deregister_ack(&mut self, publisher: &str, body: &[Element]) -> Result<()> {
        let header = self.keyed_reply(publisher, stage::PUBSUB_PUBLISH_DEREGISTER_ACK, false)?;
        self.publishers.remove(publisher);
        self.inner.core.send_message(header, body)?;
        self.inner.core.terminate();
        Ok(())
    }

    /// Receive one publication from a registered publisher
    pub fn receive_publish(&mut self, signature: &[TypeSignature]) -> Result<Received> {
        let message = self.inner.core.recv_message()?;
        self.inner.adopt(message.header());
        let from = message.header().from.clone();
        let received = self.inner.core.check_and_decode(
            &message,
            &Expected {
                handler: "PubSubBroker",
                interaction: InteractionType::PubSub,
                stage: stage::PUBSUB_PUBLISH,
                error_stage: None,
            },
            &self.inner.operation,
            signature,
        )?;
        self.reply_templates
            .insert(from, received.header.clone());
        Ok(received)
    }

    /// Report a failed publication back to its publisher
    pub fn publish_error(
        &mut self,
        publisher: &str,
        code: u32,
        extra: Option<String>,
    ) -> Result<()> {
        let header = self.keyed_reply(publisher, stage::PUBSUB_PUBLISH_ERROR, true)?;
        self.inner.core.send_message(header, &error_body(code, extra))
    }

    /// True once the interaction reached a terminal state
    #[must_use]
    pub const fn terminated(&self) -> bool {
        self.inner.core.terminated()
    }

    fn keyed_reply(&self, identity: &str, stage: u8, is_error: bool) -> Result<MessageHeader> {
        let template = self
            .reply_templates
            .get(identity)
            .ok_or_else(|| Error::UnknownSubscriber {
                subscriber: identity.to_string(),
            })?;
        Ok(template.reply(stage, is_error))
    }
}
