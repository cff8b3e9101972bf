//! Incoming message dispatch.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use ctx_sip_core::types::{Message, Method, Request, Response};
use ctx_sip_transport::TransportEvent;

use crate::agent::UserAgent;
use crate::pidf::PresenceReport;
use crate::store::AggregateStore;

/// Routes everything the transport delivers.
///
/// Requests with a recognized method are acknowledged with 200 OK and
/// then inspected for presence payloads; the rest are logged and
/// dropped. Responses are routed on the method half of their CSeq,
/// which is all the state this server keeps about requests in flight.
pub struct EventDispatcher {
    agent: Arc<UserAgent>,
    store: Arc<AggregateStore>,
    pidf_namespace: String,
}

impl EventDispatcher {
    pub fn new(
        agent: Arc<UserAgent>,
        store: Arc<AggregateStore>,
        pidf_namespace: impl Into<String>,
    ) -> EventDispatcher {
        EventDispatcher {
            agent,
            store,
            pidf_namespace: pidf_namespace.into(),
        }
    }

    /// Handles one transport event. Returns `false` once the transport
    /// reports itself closed and the event loop should stop.
    pub async fn handle_event(&self, event: TransportEvent) -> bool {
        match event {
            TransportEvent::MessageReceived {
                message, source, ..
            } => {
                self.handle_message(message, source).await;
                true
            }
            TransportEvent::Error { error } => {
                warn!(%error, "transport error");
                true
            }
            TransportEvent::Closed => {
                info!("transport closed");
                false
            }
        }
    }

    pub async fn handle_message(&self, message: Message, source: SocketAddr) {
        match message {
            Message::Request(request) => self.handle_request(request, source).await,
            Message::Response(response) => self.handle_response(response),
        }
    }

    async fn handle_request(&self, request: Request, source: SocketAddr) {
        if !is_acknowledged(&request.method) {
            info!(method = %request.method, "dropping request with unhandled method");
            return;
        }

        if let Err(e) = self.agent.acknowledge(&request, source).await {
            warn!(method = %request.method, error = %e, "failed to acknowledge request");
        }
        self.inspect_request(&request);
    }

    /// Looks for a presence payload. Only NOTIFYs that declare a body
    /// length and actually carry bytes are considered.
    fn inspect_request(&self, request: &Request) {
        if request.method != Method::Notify {
            return;
        }
        if !request.headers.contains("Content-Length") || request.body.is_empty() {
            return;
        }

        match PresenceReport::from_notify(request, &self.pidf_namespace) {
            Ok(report) => {
                info!(
                    reporter = %report.reporter,
                    status = %report.status,
                    note = %report.note,
                    "received status update"
                );
                self.store.insert(report);
            }
            Err(e) => warn!(error = %e, "discarding presence document"),
        }
    }

    fn handle_response(&self, response: Response) {
        let cseq = match response.cseq() {
            Ok(cseq) => cseq,
            Err(e) => {
                warn!(status = response.status, error = %e, "dropping response without usable CSeq");
                return;
            }
        };

        match cseq.method {
            Method::Subscribe => {
                let party = response
                    .to_address()
                    .map(|to| to.user_at_host().to_string())
                    .unwrap_or_else(|_| "<unknown>".to_string());
                if response.is_success() {
                    info!(status = response.status, %party, "subscription accepted");
                } else {
                    warn!(
                        status = response.status,
                        %party,
                        reason = %response.reason,
                        "subscription rejected"
                    );
                }
            }
            Method::Message => {
                if response.is_success() {
                    info!(status = response.status, "status snapshot delivered");
                } else {
                    warn!(
                        status = response.status,
                        reason = %response.reason,
                        "status snapshot not delivered"
                    );
                }
            }
            method => {
                info!(method = %method, status = response.status, "ignoring response for unhandled method");
            }
        }
    }
}

/// Methods answered with an automatic 200 OK. OPTIONS and PUBLISH are
/// deliberately absent and fall through to the unhandled path.
fn is_acknowledged(method: &Method) -> bool {
    matches!(
        method,
        Method::Invite
            | Method::Register
            | Method::Bye
            | Method::Ack
            | Method::Message
            | Method::Refer
            | Method::Subscribe
            | Method::Notify
    )
}
