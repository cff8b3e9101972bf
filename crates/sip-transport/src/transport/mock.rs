//! In-memory transport for tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use ctx_sip_core::Message;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// A transport that records every outgoing message instead of hitting
/// the network. Incoming traffic is the caller's business; this type
/// only observes the send side.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

#[derive(Debug)]
struct MockInner {
    local_addr: SocketAddr,
    closed: AtomicBool,
    fail_sends: AtomicBool,
    sent: Mutex<Vec<(Message, SocketAddr)>>,
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport::with_local_addr(SocketAddr::from(([127, 0, 0, 1], 5060)))
    }

    pub fn with_local_addr(local_addr: SocketAddr) -> MockTransport {
        MockTransport {
            inner: Arc::new(MockInner {
                local_addr,
                closed: AtomicBool::new(false),
                fail_sends: AtomicBool::new(false),
                sent: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Makes subsequent sends fail with an I/O error.
    pub fn set_fail_sends(&self, fail: bool) {
        self.inner.fail_sends.store(fail, Ordering::Relaxed);
    }

    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<(Message, SocketAddr)> {
        self.inner.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.inner.sent.lock().len()
    }

    /// Removes and returns everything sent so far.
    pub fn take_sent(&self) -> Vec<(Message, SocketAddr)> {
        std::mem::take(&mut *self.inner.sent.lock())
    }

    pub fn last_sent(&self) -> Option<(Message, SocketAddr)> {
        self.inner.sent.lock().last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> MockTransport {
        MockTransport::new()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr)
    }

    async fn send_message(&self, message: Message, destination: SocketAddr) -> Result<()> {
        if self.is_closed() {
            return Err(Error::TransportClosed);
        }
        if self.inner.fail_sends.load(Ordering::Relaxed) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock transport configured to fail",
            )));
        }
        self.inner.sent.lock().push((message, destination));
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
