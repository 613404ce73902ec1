//! In-process transport
//!
//! A pair of connected in-memory channels, useful for tests and for wiring
//! consumer and provider handlers inside one process. Semantics match the
//! TCP transport: whole envelopes, blocking receive, no timeout.

use std::sync::mpsc::{Receiver, Sender, channel};

use crate::protocol::{Error, Message, Result};

use super::Transport;

/// One end of an in-process duplex message channel
#[derive(Debug)]
pub struct MemoryTransport {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl MemoryTransport {
    /// Create a connected pair of transports
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = channel();
        let (b_tx, b_rx) = channel();
        (
            Self { tx: a_tx, rx: b_rx },
            Self { tx: b_tx, rx: a_rx },
        )
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, message: &Message) -> Result<()> {
        self.tx
            .send(message.clone())
            .map_err(|_| Error::Transport(String::from("peer closed")))
    }

    fn recv(&mut self) -> Result<Message> {
        self.rx
            .recv()
            .map_err(|_| Error::Transport(String::from("peer closed")))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::stage;
    use crate::protocol::{InteractionType, MessageHeader, QosLevel, SessionType};
    use crate::types::Time;

    fn sample_message() -> Message {
        let header = MessageHeader {
            from: "a".into(),
            to: "b".into(),
            authentication_id: Vec::new(),
            timestamp: Time::from_unix_millis(0),
            interaction_type: InteractionType::Send,
            interaction_stage: stage::SEND,
            transaction_id: 1,
            service_area: 4,
            service: 2,
            operation: 1,
            area_version: 1,
            is_error_message: false,
            session: SessionType::Live,
            session_name: String::new(),
            priority: 0,
            domain: Vec::new(),
            network_zone: String::new(),
            qos_level: QosLevel::BestEffort,
            supplements: Vec::new(),
        };
        Message::new(header, b"<malxml:Body/>".as_slice())
    }

    #[test]
    fn test_pair_is_duplex() {
        let (mut a, mut b) = MemoryTransport::pair();
        a.send(&sample_message()).unwrap();
        let received = b.recv().unwrap();
        assert_eq!(received.header().transaction_id, 1);
        b.send(&received).unwrap();
        assert!(a.recv().is_ok());
    }

    #[test]
    fn test_recv_after_peer_dropped_fails() {
        let (mut a, b) = MemoryTransport::pair();
        drop(b);
        assert!(matches!(a.recv(), Err(Error::Transport(_))));
    }
}
