//! End-to-end tests over loopback UDP.
//!
//! A single test socket plays both upstream proxy and presence agent:
//! outgoing requests from the server land on it (the proxy routes
//! everything), and it injects NOTIFYs and responses back.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;

use ctx_presence_core::config::ServerConfig;
use ctx_presence_core::server::ContextServer;
use ctx_sip_core::builder::{RequestBuilder, ResponseBuilder};
use ctx_sip_core::parse_message;
use ctx_sip_core::types::{Address, Message, Method};

const WAIT: Duration = Duration::from_secs(5);

const PIDF_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<presence xmlns="urn:ietf:params:xml:ns:pidf" entity="sip:alice@open-ims.test">
  <tuple id="t1">
    <status><basic>open</basic></status>
  </tuple>
  <note>In a meeting</note>
</presence>"#;

const PIDF_CLOSED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<presence xmlns="urn:ietf:params:xml:ns:pidf" entity="sip:alice@open-ims.test">
  <tuple id="t1">
    <status><basic>closed</basic></status>
  </tuple>
</presence>"#;

async fn recv_message(socket: &UdpSocket) -> Message {
    let mut buf = vec![0u8; 65_535];
    let (len, _) = timeout(WAIT, socket.recv_from(&mut buf))
        .await
        .expect("timed out waiting for a datagram")
        .expect("socket error");
    parse_message(&buf[..len]).expect("server sent an unparseable message")
}

fn notify(cseq: u32, tag: &str, body: &str) -> Message {
    Message::Request(
        RequestBuilder::new(Method::Notify, "sip:context_server@open-ims.test")
            .via("127.0.0.1:5060", &format!("z9hG4bKe2e{cseq}"))
            .max_forwards(70)
            .from_address(&Address::new("sip:alice@open-ims.test").with_tag(tag))
            .to_address(&Address::new("sip:context_server@open-ims.test"))
            .call_id(format!("e2e-notify-{cseq}"))
            .cseq(cseq)
            .event("presence")
            .body("application/pidf+xml", body.to_string())
            .build(),
    )
}

fn testbed_config(upstream: SocketAddr, interval_ms: u64) -> ServerConfig {
    ServerConfig {
        listen_addr: ([127, 0, 0, 1], 0).into(),
        proxy: upstream.to_string(),
        forward_interval_ms: interval_ms,
        ..ServerConfig::default()
    }
}

#[tokio::test]
async fn subscribes_collects_and_forwards() {
    let upstream = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = upstream.local_addr().unwrap();

    let server = ContextServer::start(testbed_config(upstream_addr, 100))
        .await
        .unwrap();
    let server_addr = server.local_addr();

    // the startup SUBSCRIBE for alice arrives at the proxy
    let message = recv_message(&upstream).await;
    let subscribe = message.as_request().expect("expected SUBSCRIBE").clone();
    assert_eq!(subscribe.method, Method::Subscribe);
    assert_eq!(subscribe.uri, "sip:alice@open-ims.test");
    assert_eq!(subscribe.headers.first("Event"), Some("presence"));
    assert_eq!(subscribe.headers.first("Max-Forwards"), Some("70"));

    // answer it, then deliver a presence NOTIFY
    let ok = ResponseBuilder::from_request(&subscribe, 200, "OK").build();
    upstream
        .send_to(&Message::Response(ok).to_bytes(), server_addr)
        .await
        .unwrap();
    upstream
        .send_to(&notify(1, "n1", PIDF_OPEN).to_bytes(), server_addr)
        .await
        .unwrap();

    // the NOTIFY is acknowledged straight back to this socket
    let message = recv_message(&upstream).await;
    let ack = message.as_response().expect("expected 200 for the NOTIFY");
    assert_eq!(ack.status, 200);
    assert_eq!(ack.cseq().unwrap().method, Method::Notify);

    // within a forwarding cycle the aggregate lands at the sink
    let message = loop {
        let message = recv_message(&upstream).await;
        if message.is_request() {
            break message;
        }
    };
    let forward = message.as_request().unwrap();
    assert_eq!(forward.method, Method::Message);
    assert_eq!(forward.uri, "sip:scim@open-ims.test");
    assert_eq!(forward.headers.first("Content-Type"), Some("text/plain"));
    assert_eq!(forward.body_str(), Some("alice@open-ims.test:open"));

    // the store was cleared by the cycle: further cycles stay silent
    let extra_forward = timeout(Duration::from_millis(350), async {
        loop {
            let message = recv_message(&upstream).await;
            if let Some(request) = message.as_request() {
                if request.method == Method::Message {
                    break;
                }
            }
        }
    })
    .await;
    assert!(extra_forward.is_err(), "an empty store must not be forwarded");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn rapid_updates_collapse_to_the_latest_status() {
    let upstream = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = upstream.local_addr().unwrap();

    let server = ContextServer::start(testbed_config(upstream_addr, 300))
        .await
        .unwrap();
    let server_addr = server.local_addr();

    // swallow the startup SUBSCRIBE
    let message = recv_message(&upstream).await;
    assert!(message.is_request());

    // two updates for alice within one forwarding window
    upstream
        .send_to(&notify(1, "n1", PIDF_OPEN).to_bytes(), server_addr)
        .await
        .unwrap();
    upstream
        .send_to(&notify(2, "n2", PIDF_CLOSED).to_bytes(), server_addr)
        .await
        .unwrap();

    // skip the two acks, then take the forwarded snapshot
    let forward = loop {
        let message = recv_message(&upstream).await;
        if let Some(request) = message.as_request() {
            if request.method == Method::Message {
                break request.clone();
            }
        }
    };
    assert_eq!(
        forward.body_str(),
        Some("alice@open-ims.test:closed"),
        "the earlier open status must be overwritten"
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn capability_probes_are_ignored() {
    let upstream = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = upstream.local_addr().unwrap();

    let server = ContextServer::start(ServerConfig {
        watched: Vec::new(),
        ..testbed_config(upstream_addr, 10_000)
    })
    .await
    .unwrap();
    let server_addr = server.local_addr();

    let options = Message::Request(
        RequestBuilder::new(Method::Options, "sip:context_server@open-ims.test")
            .via("127.0.0.1:5060", "z9hG4bKopt")
            .from_address(&Address::new("sip:probe@open-ims.test").with_tag("p1"))
            .to_address(&Address::new("sip:context_server@open-ims.test"))
            .call_id("e2e-options")
            .cseq(1)
            .build(),
    );
    upstream
        .send_to(&options.to_bytes(), server_addr)
        .await
        .unwrap();

    // then a MESSAGE, which does get acknowledged
    let message_req = Message::Request(
        RequestBuilder::new(Method::Message, "sip:context_server@open-ims.test")
            .via("127.0.0.1:5060", "z9hG4bKmsg")
            .from_address(&Address::new("sip:probe@open-ims.test").with_tag("p2"))
            .to_address(&Address::new("sip:context_server@open-ims.test"))
            .call_id("e2e-message")
            .cseq(2)
            .body("text/plain", "hello".to_string())
            .build(),
    );
    upstream
        .send_to(&message_req.to_bytes(), server_addr)
        .await
        .unwrap();

    // the first (and only) reply answers the MESSAGE, not the OPTIONS
    let reply = recv_message(&upstream).await;
    let response = reply.as_response().expect("expected a response");
    assert_eq!(response.status, 200);
    assert_eq!(response.cseq().unwrap().method, Method::Message);

    server.shutdown().await.unwrap();
}
