//! Outbound SIP behavior.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;
use uuid::Uuid;

use ctx_sip_core::builder::{RequestBuilder, ResponseBuilder};
use ctx_sip_core::types::{Address, Header, Message, Method, Request};
use ctx_sip_transport::Transport;

use crate::error::Result;

/// Stateless user agent for the context server.
///
/// Every outgoing request is built from scratch and handed to the
/// upstream proxy; acknowledgements go straight back to the network
/// source of the request they answer. No transaction or dialog state
/// is kept and nothing is ever retransmitted.
#[derive(Debug)]
pub struct UserAgent {
    transport: Arc<dyn Transport>,
    local: Address,
    proxy: SocketAddr,
    cseq: AtomicU32,
}

impl UserAgent {
    pub fn new(transport: Arc<dyn Transport>, local: Address, proxy: SocketAddr) -> UserAgent {
        UserAgent {
            transport,
            local,
            proxy,
            cseq: AtomicU32::new(0),
        }
    }

    /// Identity used in From headers of outgoing requests.
    pub fn local_identity(&self) -> &Address {
        &self.local
    }

    pub fn proxy_addr(&self) -> SocketAddr {
        self.proxy
    }

    fn next_cseq(&self) -> u32 {
        self.cseq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Answers a request with 200 OK, sent back to its network source.
    pub async fn acknowledge(&self, request: &Request, source: SocketAddr) -> Result<()> {
        let response = ResponseBuilder::from_request(request, 200, "OK").build();
        debug!(method = %request.method, %source, "acknowledging request");
        self.transport
            .send_message(Message::Response(response), source)
            .await?;
        Ok(())
    }

    /// Builds a fresh request to `target` and sends it to the proxy.
    pub async fn send_request(
        &self,
        method: Method,
        target: &Address,
        extra_headers: Vec<Header>,
    ) -> Result<()> {
        let request = self.build_request(method, target, extra_headers, None)?;
        self.transport
            .send_message(Message::Request(request), self.proxy)
            .await?;
        Ok(())
    }

    /// Sends a MESSAGE with a plain-text body to `target` via the proxy.
    pub async fn send_text(&self, target: &Address, body: String) -> Result<()> {
        let request =
            self.build_request(Method::Message, target, Vec::new(), Some(("text/plain", body)))?;
        self.transport
            .send_message(Message::Request(request), self.proxy)
            .await?;
        Ok(())
    }

    fn build_request(
        &self,
        method: Method,
        target: &Address,
        extra_headers: Vec<Header>,
        body: Option<(&str, String)>,
    ) -> Result<Request> {
        let local_addr = self.transport.local_addr()?;
        let branch = format!("z9hG4bK{}", Uuid::new_v4().simple());
        let call_id = Uuid::new_v4().to_string();
        let user = self.local.user_at_host().split('@').next().unwrap_or("");

        let mut builder = RequestBuilder::new(method, target.uri())
            .via(&local_addr.to_string(), &branch)
            .max_forwards(70)
            .from_address(&self.local.clone().with_tag(short_token()))
            .to_address(target)
            .call_id(call_id)
            .cseq(self.next_cseq())
            .contact(&format!("sip:{user}@{local_addr}"));

        for header in extra_headers {
            builder = builder.header(header.name, header.value);
        }
        if let Some((content_type, body)) = body {
            builder = builder.body(content_type, body);
        }
        Ok(builder.build())
    }
}

// From-tags only need to be unique per request, not cryptographic
fn short_token() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..10].to_string()
}
