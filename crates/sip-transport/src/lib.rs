//! SIP transport layer for the context server.
//!
//! Only UDP is implemented; the deployment this serves speaks plain UDP
//! end to end. A [`MockTransport`] is provided for exercising the layers
//! above without sockets.

pub mod error;
pub mod transport;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use transport::{MockTransport, Transport, TransportEvent, UdpTransport};

/// Binds a UDP transport to the specified address.
pub async fn bind_udp(
    addr: std::net::SocketAddr,
) -> Result<(UdpTransport, tokio::sync::mpsc::Receiver<TransportEvent>)> {
    UdpTransport::bind(addr, None).await
}

/// Re-export of common types for easier use.
pub mod prelude {
    pub use crate::{
        Error, MockTransport, Result, Transport, TransportEvent, UdpTransport, bind_udp,
    };
}
