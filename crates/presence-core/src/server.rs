//! Server assembly and lifecycle.
//!
//! [`ContextServer::start`] wires the pieces together: it binds the UDP
//! transport, resolves the upstream proxy, fires the startup
//! subscriptions and spawns the two background tasks (the event loop
//! feeding the dispatcher, and the periodic forwarder). The returned
//! handle owns both tasks; dropping it without [`ContextServer::shutdown`]
//! leaves them running until the runtime goes away.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use ctx_sip_core::types::Address;
use ctx_sip_transport::{Transport, UdpTransport};

use crate::agent::UserAgent;
use crate::config::ServerConfig;
use crate::dispatcher::EventDispatcher;
use crate::error::{Error, Result};
use crate::forwarder::Forwarder;
use crate::store::AggregateStore;
use crate::subscriber;

/// A running context server.
pub struct ContextServer {
    transport: Arc<dyn Transport>,
    local_addr: SocketAddr,
    event_loop: JoinHandle<()>,
    forwarder: JoinHandle<()>,
}

impl ContextServer {
    /// Starts a server from its configuration.
    pub async fn start(config: ServerConfig) -> Result<ContextServer> {
        config.validate()?;

        let local = Address::parse(&config.local_uri)?;
        let sink = Address::parse(&config.sink_uri)?;
        let watched = config
            .watched
            .iter()
            .map(|party| Address::parse(party))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let proxy = resolve_proxy(&config.proxy_authority()).await?;

        let (transport, mut events) = UdpTransport::bind(config.listen_addr, None).await?;
        let local_addr = transport.local_addr()?;
        let transport: Arc<dyn Transport> = Arc::new(transport);

        let agent = Arc::new(UserAgent::new(transport.clone(), local, proxy));
        let store = Arc::new(AggregateStore::new());
        let dispatcher =
            EventDispatcher::new(agent.clone(), store.clone(), config.pidf_namespace.clone());

        let event_loop = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if !dispatcher.handle_event(event).await {
                    break;
                }
            }
            info!("event loop terminated");
        });

        subscriber::subscribe_all(&agent, &watched).await;

        let forwarder = Forwarder::new(store, agent, sink, config.forward_interval()).spawn();

        info!(%local_addr, %proxy, "context server started");

        Ok(ContextServer {
            transport,
            local_addr,
            event_loop,
            forwarder,
        })
    }

    /// Address the transport actually bound to. Useful when the
    /// configuration asked for port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops the background tasks and closes the transport.
    pub async fn shutdown(self) -> Result<()> {
        info!("shutting down context server");
        self.forwarder.abort();
        self.event_loop.abort();
        self.transport.close().await?;
        Ok(())
    }
}

/// Resolves the proxy authority to the socket address all requests go to.
async fn resolve_proxy(authority: &str) -> Result<SocketAddr> {
    let mut addrs = tokio::net::lookup_host(authority)
        .await
        .map_err(|e| Error::resolve(format!("cannot resolve proxy {authority}: {e}")))?;
    addrs
        .next()
        .ok_or_else(|| Error::resolve(format!("proxy {authority} resolved to no addresses")))
}
