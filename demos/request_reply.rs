//! Request/response exchange between two MAL endpoints over TCP.

use std::thread;

use mal::codec::XmlCodec;
use mal::interaction::{
    ConsumerEndpoint, Operation, ProviderEndpoint, RequestConsumer, RequestProvider,
    TransactionIdAllocator,
};
use mal::transport::{TcpAcceptor, TcpTransport};
use mal::types::{Attribute, AttributeType, Element, TypeSignature};

const GET_VALUE: Operation = Operation::new(4, 2, 2, 1);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("MAL Request/Response Example");
    println!("============================\n");

    let acceptor = TcpAcceptor::bind("127.0.0.1:0")?;
    let addr = acceptor.local_addr()?;

    let provider = thread::spawn(move || -> mal::Result<()> {
        let transactions = TransactionIdAllocator::new();
        let transport = acceptor.accept_one()?;
        let mut provider = RequestProvider::new(
            Box::new(transport),
            Box::new(XmlCodec::new()),
            GET_VALUE,
            ProviderEndpoint::new("provider"),
            &transactions,
        );

        let request =
            provider.receive_request(&[TypeSignature::Attribute(AttributeType::Identifier)])?;
        println!("provider: received request {:?}", request.body);
        provider.response(&[Element::Attribute(Attribute::Double(42.5))])?;
        Ok(())
    });

    let transactions = TransactionIdAllocator::new();
    let transport = TcpTransport::connect(addr)?;
    let mut consumer = RequestConsumer::new(
        Box::new(transport),
        Box::new(XmlCodec::new()),
        GET_VALUE,
        ConsumerEndpoint::new("consumer", "provider"),
        &transactions,
    );

    consumer.request(&[Element::Attribute(Attribute::Identifier("PARAM-1".into()))])?;
    println!("consumer: request sent (transaction {})", consumer.transaction_id());

    let response = consumer.receive_response(&[TypeSignature::Attribute(AttributeType::Double)])?;
    println!("consumer: received response {:?}", response.body);
    println!("consumer: terminated = {}", consumer.terminated());

    provider.join().expect("provider thread panicked")?;
    println!("\ndone");
    Ok(())
}
