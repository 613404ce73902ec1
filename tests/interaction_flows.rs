//! End-to-end interaction pattern flows over the in-memory transport.

use std::thread;

use mal::Error;
use mal::codec::XmlCodec;
use mal::interaction::{
    ConsumerEndpoint, InvokeConsumer, InvokeProvider, Operation, ProgressConsumer, ProgressEvent,
    ProgressProvider, ProviderEndpoint, PubSubBroker, PubSubConsumer, PubSubPublisher,
    PublishRegistrationEvent, RegistrationEvent, RequestConsumer, RequestProvider,
    SendConsumer, SendProvider, SubmitConsumer, SubmitProvider, TransactionIdAllocator,
};
use mal::protocol::ErrorCode;
use mal::transport::MemoryTransport;
use mal::types::{Attribute, AttributeType, Element, TypeSignature};

const GET_VALUE: Operation = Operation::new(4, 2, 2, 1);

fn identifier(text: &str) -> Element {
    Element::Attribute(Attribute::Identifier(text.into()))
}

fn identifier_sig() -> TypeSignature {
    TypeSignature::Attribute(AttributeType::Identifier)
}

fn double_sig() -> TypeSignature {
    TypeSignature::Attribute(AttributeType::Double)
}

#[test]
fn request_happy_path_terminates_both_sides() {
    let (consumer_side, provider_side) = MemoryTransport::pair();

    let provider = thread::spawn(move || {
        let transactions = TransactionIdAllocator::new();
        let mut provider = RequestProvider::new(
            Box::new(provider_side),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("provider"),
            &transactions,
        );
        let request = provider.receive_request(&[identifier_sig()]).unwrap();
        assert_eq!(request.body, vec![identifier("PARAM-1")]);
        assert!(!provider.terminated());
        provider
            .response(&[Element::Attribute(Attribute::Double(42.5))])
            .unwrap();
        provider.terminated()
    });

    let transactions = TransactionIdAllocator::new();
    let mut consumer = RequestConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    consumer.request(&[identifier("PARAM-1")]).unwrap();
    assert!(!consumer.terminated());
    let response = consumer.receive_response(&[double_sig()]).unwrap();

    assert_eq!(response.body, vec![Element::Attribute(Attribute::Double(42.5))]);
    assert_eq!(response.header.transaction_id, consumer.transaction_id());
    assert!(consumer.terminated());
    assert!(provider.join().unwrap());
}

#[test]
fn request_error_path_carries_the_code() {
    let (consumer_side, provider_side) = MemoryTransport::pair();

    let provider = thread::spawn(move || {
        let transactions = TransactionIdAllocator::new();
        let mut provider = RequestProvider::new(
            Box::new(provider_side),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("provider"),
            &transactions,
        );
        provider.receive_request(&[identifier_sig()]).unwrap();
        provider
            .error(ErrorCode::Unknown.as_u32(), Some("no such parameter".into()))
            .unwrap();
        provider.terminated()
    });

    let transactions = TransactionIdAllocator::new();
    let mut consumer = RequestConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    consumer.request(&[identifier("PARAM-9")]).unwrap();
    let err = consumer.receive_response(&[double_sig()]).unwrap_err();

    match err {
        Error::Remote { code, extra } => {
            assert_eq!(code, ErrorCode::Unknown.as_u32());
            assert_eq!(extra.as_deref(), Some("no such parameter"));
        }
        other => panic!("expected remote error, got {other}"),
    }
    assert!(consumer.terminated());
    assert!(provider.join().unwrap());
}

#[test]
fn submit_provider_rejects_request_stage() {
    let (consumer_side, provider_side) = MemoryTransport::pair();

    // A Request consumer talking to a Submit provider violates the pattern.
    let transactions = TransactionIdAllocator::new();
    let mut wrong_consumer = RequestConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    wrong_consumer.request(&[identifier("PARAM-1")]).unwrap();

    let mut provider = SubmitProvider::new(
        Box::new(provider_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ProviderEndpoint::new("provider"),
        &transactions,
    );
    let err = provider.receive_submit(&[identifier_sig()]).unwrap_err();

    match &err {
        Error::InvalidStage {
            handler,
            expected_stage,
            got_stage,
            ..
        } => {
            assert_eq!(*handler, "SubmitProvider");
            assert_eq!(*expected_stage, 1);
            assert_eq!(*got_stage, 1);
        }
        other => panic!("expected stage violation, got {other}"),
    }
    let text = err.to_string();
    assert!(text.contains("SUBMIT:1"), "diagnostic was {text:?}");
    assert!(text.contains("REQUEST:1"), "diagnostic was {text:?}");
}

#[test]
fn submit_ack_flow() {
    let (consumer_side, provider_side) = MemoryTransport::pair();

    let provider = thread::spawn(move || {
        let transactions = TransactionIdAllocator::new();
        let mut provider = SubmitProvider::new(
            Box::new(provider_side),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("provider"),
            &transactions,
        );
        provider.receive_submit(&[identifier_sig()]).unwrap();
        provider.ack(&[]).unwrap();
        provider.terminated()
    });

    let transactions = TransactionIdAllocator::new();
    let mut consumer = SubmitConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    consumer.submit(&[identifier("PARAM-1")]).unwrap();
    let ack = consumer.receive_ack(&[]).unwrap();
    assert!(ack.body.is_empty());
    assert!(consumer.terminated());
    assert!(provider.join().unwrap());
}

#[test]
fn send_is_fire_and_forget() {
    let (consumer_side, provider_side) = MemoryTransport::pair();
    let transactions = TransactionIdAllocator::new();

    let mut consumer = SendConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    consumer.send(&[identifier("EVENT")]).unwrap();
    assert!(consumer.terminated());

    let mut provider = SendProvider::new(
        Box::new(provider_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ProviderEndpoint::new("provider"),
        &transactions,
    );
    let received = provider.receive_send(&[identifier_sig()]).unwrap();
    assert_eq!(received.body, vec![identifier("EVENT")]);
    assert!(provider.terminated());
}

#[test]
fn invoke_ack_then_deferred_response() {
    let (consumer_side, provider_side) = MemoryTransport::pair();

    let provider = thread::spawn(move || {
        let transactions = TransactionIdAllocator::new();
        let mut provider = InvokeProvider::new(
            Box::new(provider_side),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("provider"),
            &transactions,
        );
        provider.receive_invoke(&[identifier_sig()]).unwrap();
        provider.ack(&[]).unwrap();
        assert!(!provider.terminated());
        provider
            .response(&[Element::Attribute(Attribute::Double(7.25))])
            .unwrap();
        provider.terminated()
    });

    let transactions = TransactionIdAllocator::new();
    let mut consumer = InvokeConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    consumer.invoke(&[identifier("PARAM-1")]).unwrap();
    consumer.receive_ack(&[]).unwrap();
    assert!(!consumer.terminated());
    let response = consumer.receive_response(&[double_sig()]).unwrap();
    assert_eq!(response.body, vec![Element::Attribute(Attribute::Double(7.25))]);
    assert!(consumer.terminated());
    assert!(provider.join().unwrap());
}

#[test]
fn progress_streams_updates_then_response() {
    let (consumer_side, provider_side) = MemoryTransport::pair();

    let provider = thread::spawn(move || {
        let transactions = TransactionIdAllocator::new();
        let mut provider = ProgressProvider::new(
            Box::new(provider_side),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("provider"),
            &transactions,
        );
        provider.receive_progress(&[identifier_sig()]).unwrap();
        provider.ack(&[]).unwrap();
        for step in 0..3u32 {
            provider
                .update(&[Element::Attribute(Attribute::UInteger(step))])
                .unwrap();
        }
        provider
            .response(&[Element::Attribute(Attribute::Double(1.0))])
            .unwrap();
        provider.terminated()
    });

    let transactions = TransactionIdAllocator::new();
    let mut consumer = ProgressConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    consumer.progress(&[identifier("PARAM-1")]).unwrap();
    consumer.receive_ack(&[]).unwrap();

    let update_sig = [TypeSignature::Attribute(AttributeType::UInteger)];
    let response_sig = [double_sig()];
    let mut updates = Vec::new();
    loop {
        match consumer.receive_update(&update_sig, &response_sig).unwrap() {
            ProgressEvent::Update(update) => {
                assert!(!consumer.terminated());
                updates.push(update.body[0].clone());
            }
            ProgressEvent::Response(response) => {
                assert_eq!(response.body, vec![Element::Attribute(Attribute::Double(1.0))]);
                break;
            }
        }
    }

    assert_eq!(
        updates,
        vec![
            Element::Attribute(Attribute::UInteger(0)),
            Element::Attribute(Attribute::UInteger(1)),
            Element::Attribute(Attribute::UInteger(2)),
        ]
    );
    assert!(consumer.terminated());
    assert!(provider.join().unwrap());
}

#[test]
fn progress_update_error_terminates_early() {
    let (consumer_side, provider_side) = MemoryTransport::pair();

    let provider = thread::spawn(move || {
        let transactions = TransactionIdAllocator::new();
        let mut provider = ProgressProvider::new(
            Box::new(provider_side),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("provider"),
            &transactions,
        );
        provider.receive_progress(&[identifier_sig()]).unwrap();
        provider.ack(&[]).unwrap();
        provider
            .update(&[Element::Attribute(Attribute::UInteger(0))])
            .unwrap();
        provider
            .update_error(ErrorCode::Internal.as_u32(), None)
            .unwrap();
        provider.terminated()
    });

    let transactions = TransactionIdAllocator::new();
    let mut consumer = ProgressConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    consumer.progress(&[identifier("PARAM-1")]).unwrap();
    consumer.receive_ack(&[]).unwrap();

    let update_sig = [TypeSignature::Attribute(AttributeType::UInteger)];
    let response_sig = [double_sig()];
    assert!(matches!(
        consumer.receive_update(&update_sig, &response_sig).unwrap(),
        ProgressEvent::Update(_)
    ));
    let err = consumer
        .receive_update(&update_sig, &response_sig)
        .unwrap_err();
    assert!(matches!(err, Error::Remote { code, .. } if code == ErrorCode::Internal.as_u32()));
    assert!(consumer.terminated());
    assert!(provider.join().unwrap());
}

#[test]
fn provider_rejects_foreign_operation() {
    let (consumer_side, provider_side) = MemoryTransport::pair();
    let transactions = TransactionIdAllocator::new();

    let mut consumer = RequestConsumer::new(
        Box::new(consumer_side),
        Box::new(XmlCodec::new()),
        Operation::new(4, 2, 9, 1),
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );
    consumer.request(&[identifier("PARAM-1")]).unwrap();

    let mut provider = RequestProvider::new(
        Box::new(provider_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ProviderEndpoint::new("provider"),
        &transactions,
    );
    let err = provider.receive_request(&[identifier_sig()]).unwrap_err();
    match err {
        Error::UnsupportedOperation { kind, code, .. } => {
            assert_eq!(kind, "operation");
            assert_eq!(code, ErrorCode::UnsupportedOperation);
        }
        other => panic!("expected operation mismatch, got {other}"),
    }
}

#[test]
fn pubsub_register_notify_deregister() {
    let (subscriber_side, broker_side) = MemoryTransport::pair();

    let broker = thread::spawn(move || {
        let transactions = TransactionIdAllocator::new();
        let mut broker = PubSubBroker::new(
            Box::new(broker_side),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("broker"),
            &transactions,
        );

        let event = broker
            .receive_registration(&[identifier_sig()], &[identifier_sig()])
            .unwrap();
        let subscriber = match &event {
            RegistrationEvent::Register(received) => received.header.from.clone(),
            RegistrationEvent::Deregister(_) => panic!("expected a registration"),
        };
        broker.register_ack(&subscriber, &[]).unwrap();
        assert_eq!(broker.subscribers(), vec![subscriber.as_str()]);

        broker
            .notify(
                &subscriber,
                &[Element::Attribute(Attribute::String("update 1".into()))],
            )
            .unwrap();

        let event = broker
            .receive_registration(&[identifier_sig()], &[identifier_sig()])
            .unwrap();
        assert!(matches!(event, RegistrationEvent::Deregister(_)));
        broker.deregister_ack(&subscriber, &[]).unwrap();
        assert!(broker.subscribers().is_empty());

        // The registration is gone, so no further notification can be built.
        broker
            .notify(&subscriber, &[])
            .unwrap_err()
    });

    let transactions = TransactionIdAllocator::new();
    let mut subscriber = PubSubConsumer::new(
        Box::new(subscriber_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("subscriber", "broker"),
        &transactions,
    );

    subscriber.register(&[identifier("SUB-KEY")]).unwrap();
    subscriber.receive_register_ack(&[]).unwrap();

    let notify = subscriber
        .receive_notify(&[TypeSignature::Attribute(AttributeType::String)])
        .unwrap();
    assert_eq!(
        notify.body,
        vec![Element::Attribute(Attribute::String("update 1".into()))]
    );
    assert_eq!(notify.header.transaction_id, subscriber.transaction_id());
    assert!(!subscriber.terminated());

    subscriber.deregister(&[identifier("SUB-KEY")]).unwrap();
    subscriber.receive_deregister_ack(&[]).unwrap();
    assert!(subscriber.terminated());

    let broker_err = broker.join().unwrap();
    assert!(matches!(broker_err, Error::UnknownSubscriber { .. }));
}

#[test]
fn pubsub_publisher_lifecycle() {
    let (publisher_side, broker_side) = MemoryTransport::pair();

    let broker = thread::spawn(move || {
        let transactions = TransactionIdAllocator::new();
        let mut broker = PubSubBroker::new(
            Box::new(broker_side),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("broker"),
            &transactions,
        );

        let event = broker
            .receive_publish_registration(&[identifier_sig()], &[identifier_sig()])
            .unwrap();
        let publisher = match &event {
            PublishRegistrationEvent::Register(received) => received.header.from.clone(),
            PublishRegistrationEvent::Deregister(_) => panic!("expected a registration"),
        };
        broker.publish_register_ack(&publisher, &[]).unwrap();
        assert_eq!(broker.publishers(), vec![publisher.as_str()]);

        let publication = broker.receive_publish(&[double_sig()]).unwrap();
        assert_eq!(
            publication.body,
            vec![Element::Attribute(Attribute::Double(3.5))]
        );

        let event = broker
            .receive_publish_registration(&[identifier_sig()], &[identifier_sig()])
            .unwrap();
        assert!(matches!(event, PublishRegistrationEvent::Deregister(_)));
        broker.publish_deregister_ack(&publisher, &[]).unwrap();
        assert!(broker.publishers().is_empty());
        broker.terminated()
    });

    let transactions = TransactionIdAllocator::new();
    let mut publisher = PubSubPublisher::new(
        Box::new(publisher_side),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ProviderEndpoint::with_broker("publisher", "broker"),
        &transactions,
    );

    publisher.publish_register(&[identifier("PUB-KEY")]).unwrap();
    publisher.receive_publish_register_ack(&[]).unwrap();
    publisher
        .publish(&[Element::Attribute(Attribute::Double(3.5))])
        .unwrap();
    publisher.publish_deregister(&[identifier("PUB-KEY")]).unwrap();
    publisher.receive_publish_deregister_ack(&[]).unwrap();
    assert!(publisher.terminated());
    assert!(broker.join().unwrap());
}
