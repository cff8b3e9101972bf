//! UDP transport.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use ctx_sip_core::{Message, parse_message};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportEvent};

// Default event channel capacity
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Largest datagram the receive loop will accept.
const MAX_DATAGRAM_SIZE: usize = 65_535;

/// UDP transport for SIP messages.
///
/// One socket serves both directions. A background task parses incoming
/// datagrams and forwards them as [`TransportEvent`]s on the channel
/// returned by [`UdpTransport::bind`].
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    socket: Arc<UdpSocket>,
    closed: AtomicBool,
    events_tx: mpsc::Sender<TransportEvent>,
}

impl UdpTransport {
    /// Binds a transport to the given address and starts its receive loop.
    pub async fn bind(
        addr: SocketAddr,
        channel_capacity: Option<usize>,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        let capacity = channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        let (events_tx, events_rx) = mpsc::channel(capacity);

        let socket = Arc::new(UdpSocket::bind(addr).await?);
        let local_addr = socket.local_addr()?;
        info!("SIP UDP transport bound to {}", local_addr);

        let transport = UdpTransport {
            inner: Arc::new(UdpTransportInner {
                socket,
                closed: AtomicBool::new(false),
                events_tx,
            }),
        };

        transport.spawn_receive_loop(local_addr);

        Ok((transport, events_rx))
    }

    // Spawns the task that reads datagrams off the socket
    fn spawn_receive_loop(&self, local_addr: SocketAddr) {
        let transport = self.clone();

        tokio::spawn(async move {
            let inner = &transport.inner;
            let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

            while !inner.closed.load(Ordering::Relaxed) {
                match inner.socket.recv_from(&mut buffer).await {
                    Ok((len, source)) => {
                        debug!("Received {} bytes from {}", len, source);

                        match parse_message(&buffer[..len]) {
                            Ok(message) => {
                                let event = TransportEvent::MessageReceived {
                                    message,
                                    source,
                                    destination: local_addr,
                                };

                                if inner.events_tx.send(event).await.is_err() {
                                    error!("Event receiver dropped, stopping receive loop");
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Dropping unparseable datagram from {}: {}", source, e);
                                let _ = inner
                                    .events_tx
                                    .send(TransportEvent::Error {
                                        error: format!("error parsing SIP message: {e}"),
                                    })
                                    .await;
                            }
                        }
                    }
                    Err(e) => {
                        if inner.closed.load(Ordering::Relaxed) {
                            break;
                        }

                        error!("Error receiving UDP packet: {}", e);
                        let _ = inner
                            .events_tx
                            .send(TransportEvent::Error {
                                error: format!("error receiving packet: {e}"),
                            })
                            .await;
                    }
                }
            }

            // Tell the consumer no further events will arrive
            let _ = inner.events_tx.send(TransportEvent::Closed).await;
            info!("UDP receive loop terminated");
        });
    }
}

#[async_trait::async_trait]
impl Transport for UdpTransport {
    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.socket.local_addr()?)
    }

    async fn send_message(&self, message: Message, destination: SocketAddr) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }

        let bytes = message.to_bytes();
        debug!("Sending {} byte message to {}", bytes.len(), destination);

        self.inner.socket.send_to(&bytes, destination).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.inner.closed.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.socket.local_addr() {
            Ok(addr) => write!(f, "UdpTransport({addr})"),
            Err(_) => write!(f, "UdpTransport(<unbound>)"),
        }
    }
}
