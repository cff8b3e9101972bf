//! Transport abstraction and implementations.

mod mock;
mod udp;

pub use mock::MockTransport;
pub use udp::UdpTransport;

use std::fmt;
use std::net::SocketAddr;

use ctx_sip_core::Message;

use crate::error::Result;

/// Events emitted by a transport toward its consumer.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A datagram arrived and parsed as a SIP message
    MessageReceived {
        message: Message,
        source: SocketAddr,
        destination: SocketAddr,
    },
    /// A datagram could not be parsed, or a socket operation failed.
    /// The transport keeps running after emitting this.
    Error { error: String },
    /// The receive loop has terminated; no further events will arrive
    Closed,
}

/// A bidirectional, connectionless SIP message transport.
///
/// Sending is fire-and-forget: a returned `Ok` means the datagram was
/// handed to the socket, not that anyone received it.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Local address the transport is bound to.
    fn local_addr(&self) -> Result<SocketAddr>;

    /// Serializes and sends a message to the destination.
    async fn send_message(&self, message: Message, destination: SocketAddr) -> Result<()>;

    /// Closes the transport. Sends fail afterwards.
    async fn close(&self) -> Result<()>;

    fn is_closed(&self) -> bool;
}
