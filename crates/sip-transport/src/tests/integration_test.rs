//! Loopback tests for the UDP transport.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use ctx_sip_core::builder::{RequestBuilder, ResponseBuilder};
use ctx_sip_core::types::{Address, Message, Method};
use pretty_assertions::assert_eq;

use crate::error::Error;
use crate::transport::{Transport, TransportEvent, UdpTransport};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn loopback() -> SocketAddr {
    ([127, 0, 0, 1], 0).into()
}

fn subscribe(target: &str) -> Message {
    Message::Request(
        RequestBuilder::new(Method::Subscribe, target)
            .via("127.0.0.1:0", "z9hG4bKtest")
            .from_address(&Address::new("sip:context_server@open-ims.test").with_tag("t1"))
            .to_address(&Address::new(target))
            .call_id("transport-test-1")
            .cseq(1)
            .event("presence")
            .build(),
    )
}

async fn wait_for_message(events: &mut mpsc::Receiver<TransportEvent>) -> (Message, SocketAddr) {
    let event = timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for transport event")
        .expect("event channel closed");
    match event {
        TransportEvent::MessageReceived {
            message, source, ..
        } => (message, source),
        other => panic!("unexpected transport event: {other:?}"),
    }
}

#[tokio::test]
async fn delivers_requests_and_responses_across_sockets() {
    let (client, mut client_events) = UdpTransport::bind(loopback(), None).await.unwrap();
    let (server, mut server_events) = UdpTransport::bind(loopback(), None).await.unwrap();
    let server_addr = server.local_addr().unwrap();

    client
        .send_message(subscribe("sip:alice@open-ims.test"), server_addr)
        .await
        .unwrap();

    let (message, source) = wait_for_message(&mut server_events).await;
    assert_eq!(source, client.local_addr().unwrap());
    let request = message.as_request().expect("expected a request").clone();
    assert_eq!(request.method, Method::Subscribe);
    assert_eq!(request.headers.first("Event"), Some("presence"));

    let reply = ResponseBuilder::from_request(&request, 200, "OK").build();
    server
        .send_message(Message::Response(reply), source)
        .await
        .unwrap();

    let (message, _) = wait_for_message(&mut client_events).await;
    let response = message.as_response().expect("expected a response");
    assert_eq!(response.status, 200);
    assert_eq!(response.cseq().unwrap().method, Method::Subscribe);
}

#[tokio::test]
async fn surfaces_unparseable_datagrams_as_errors() {
    let (server, mut events) = UdpTransport::bind(loopback(), None).await.unwrap();
    let addr = server.local_addr().unwrap();

    let raw = tokio::net::UdpSocket::bind(loopback()).await.unwrap();
    raw.send_to(b"definitely not sip", addr).await.unwrap();

    let event = timeout(EVENT_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for transport event")
        .expect("event channel closed");
    assert!(matches!(event, TransportEvent::Error { .. }), "got {event:?}");
}

#[tokio::test]
async fn close_stops_sending() {
    let (transport, _events) = UdpTransport::bind(loopback(), None).await.unwrap();
    assert!(!transport.is_closed());

    transport.close().await.unwrap();
    assert!(transport.is_closed());

    let result = transport
        .send_message(subscribe("sip:alice@open-ims.test"), ([127, 0, 0, 1], 9).into())
        .await;
    assert!(matches!(result, Err(Error::TransportClosed)));
}
