//! TCP transport
//!
//! Frames each envelope as two length-prefixed segments: the out-of-band
//! header block (`Name: value` lines) followed by the encoded body. Lengths
//! are little-endian `u32`. One connection carries one conversation at a
//! time; concurrent transactions take one connection each.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, trace};

use crate::protocol::{Error, Message, MessageHeader, Result};

use super::Transport;

/// Upper bound on a framed segment, to reject corrupt length prefixes
const MAX_SEGMENT_SIZE: u32 = 16 * 1024 * 1024;

/// A connected TCP message channel
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to a listening peer
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        debug!(peer = ?stream.peer_addr().ok(), "connected");
        Ok(Self { stream })
    }

    /// Local address of this connection
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.stream.local_addr()?)
    }

    fn write_segment(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            Error::Transport(format!("segment of {} bytes exceeds frame limit", bytes.len()))
        })?;
        self.stream.write_all(&len.to_le_bytes())?;
        self.stream.write_all(bytes)?;
        Ok(())
    }

    fn read_segment(&mut self) -> Result<Vec<u8>> {
        let mut len_bytes = [0u8; 4];
        self.stream.read_exact(&mut len_bytes)?;
        let len = u32::from_le_bytes(len_bytes);
        if len > MAX_SEGMENT_SIZE {
            return Err(Error::Transport(format!(
                "segment length {len} exceeds frame limit"
            )));
        }
        let mut bytes = vec![0u8; len as usize];
        self.stream.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, message: &Message) -> Result<()> {
        let header_block = encode_header_block(message.header());
        trace!(
            to = %message.header().to,
            stage = message.header().interaction_stage,
            body_len = message.len(),
            "sending envelope"
        );
        self.write_segment(header_block.as_bytes())?;
        self.write_segment(message.body())?;
        self.stream.flush()?;
        Ok(())
    }

    fn recv(&mut self) -> Result<Message> {
        let header_block = self.read_segment()?;
        let header_text = String::from_utf8(header_block)
            .map_err(|e| Error::Transport(format!("header block is not UTF-8: {e}")))?;
        let header = decode_header_block(&header_text)?;
        let body = self.read_segment()?;
        trace!(
            from = %header.from,
            stage = header.interaction_stage,
            body_len = body.len(),
            "received envelope"
        );
        Ok(Message::new(header, body))
    }

    fn close(&mut self) -> Result<()> {
        self.stream.shutdown(Shutdown::Both)?;
        Ok(())
    }
}

/// A bound TCP listener handing out one connection at a time
#[derive(Debug)]
pub struct TcpAcceptor {
    listener: TcpListener,
}

impl TcpAcceptor {
    /// Bind to the given address and start listening
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        debug!(local = ?listener.local_addr().ok(), "listening");
        Ok(Self { listener })
    }

    /// Local address of the listener
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Block until one peer connects
    pub fn accept_one(&self) -> Result<TcpTransport> {
        let (stream, peer) = self.listener.accept()?;
        debug!(%peer, "accepted connection");
        Ok(TcpTransport { stream })
    }
}

fn encode_header_block(header: &MessageHeader) -> String {
    let mut block = String::new();
    for (name, value) in header.field_pairs() {
        block.push_str(name);
        block.push_str(": ");
        block.push_str(&value);
        block.push_str("\r\n");
    }
    block
}

fn decode_header_block(text: &str) -> Result<MessageHeader> {
    let pairs = text
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split_once(": ")
                .ok_or_else(|| Error::Transport(format!("malformed header line: {line:?}")))
        })
        .collect::<Result<Vec<_>>>()?;
    MessageHeader::from_field_pairs(pairs)
}
