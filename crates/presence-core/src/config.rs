//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use ctx_sip_core::Address;

use crate::error::{Error, Result};
use crate::pidf::PIDF_NAMESPACE;

/// Port assumed when the proxy is given without one.
pub const DEFAULT_SIP_PORT: u16 = 5060;

/// Everything the server needs to run.
///
/// Defaults match the IMS testbed this was written for: listen on 7777,
/// route through the S-CSCF, watch alice, report to the SCIM.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the UDP transport binds to
    pub listen_addr: SocketAddr,

    /// Upstream proxy every outgoing request is sent to, as `host[:port]`
    pub proxy: String,

    /// URI this server identifies itself as in From headers
    pub local_uri: String,

    /// Parties whose presence is subscribed to at startup
    pub watched: Vec<String>,

    /// URI aggregated status snapshots are delivered to
    pub sink_uri: String,

    /// Delay between forwarding cycles, in milliseconds
    pub forward_interval_ms: u64,

    /// XML namespace presence documents are expected to use
    pub pidf_namespace: String,
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 7777)),
            proxy: "scscf.open-ims.test:6060".to_string(),
            local_uri: "sip:context_server@open-ims.test".to_string(),
            watched: vec!["sip:alice@open-ims.test".to_string()],
            sink_uri: "sip:scim@open-ims.test".to_string(),
            forward_interval_ms: 30_000,
            pidf_namespace: PIDF_NAMESPACE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads a configuration from a JSON document. Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> Result<ServerConfig> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("invalid configuration: {e}")))
    }

    /// Checks the parts that would otherwise fail deep inside startup.
    pub fn validate(&self) -> Result<()> {
        if self.proxy.trim().is_empty() {
            return Err(Error::config("proxy must not be empty"));
        }
        if self.forward_interval_ms == 0 {
            return Err(Error::config("forward_interval_ms must be positive"));
        }
        Address::parse(&self.local_uri)
            .map_err(|e| Error::config(format!("local_uri: {e}")))?;
        Address::parse(&self.sink_uri)
            .map_err(|e| Error::config(format!("sink_uri: {e}")))?;
        for party in &self.watched {
            Address::parse(party)
                .map_err(|e| Error::config(format!("watched party {party:?}: {e}")))?;
        }
        Ok(())
    }

    pub fn forward_interval(&self) -> Duration {
        Duration::from_millis(self.forward_interval_ms)
    }

    /// The proxy as `host:port`, appending [`DEFAULT_SIP_PORT`] when the
    /// configured value has no port.
    pub fn proxy_authority(&self) -> String {
        if self.proxy.contains(':') {
            self.proxy.clone()
        } else {
            format!("{}:{}", self.proxy, DEFAULT_SIP_PORT)
        }
    }
}
