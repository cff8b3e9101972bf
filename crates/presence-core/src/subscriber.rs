//! Startup presence subscriptions.

use tracing::{debug, warn};

use ctx_sip_core::types::{Address, Header, Method};

use crate::agent::UserAgent;
use crate::error::Result;

/// Subscription lifetime requested from the presence agents.
pub const DEFAULT_EXPIRES_SECS: u32 = 3600;

/// Sends one presence SUBSCRIBE per watched party.
///
/// Failures are logged and the party skipped; nothing retries. The
/// subscription is never refreshed either, matching the fire-and-forget
/// posture of the rest of the server.
pub async fn subscribe_all(agent: &UserAgent, watched: &[Address]) {
    for party in watched {
        match subscribe(agent, party).await {
            Ok(()) => debug!(party = %party, "subscription request sent"),
            Err(e) => warn!(party = %party, error = %e, "failed to send subscription request"),
        }
    }
}

async fn subscribe(agent: &UserAgent, party: &Address) -> Result<()> {
    agent
        .send_request(
            Method::Subscribe,
            party,
            vec![
                Header::new("Event", "presence"),
                Header::new("Accept", "application/pidf+xml"),
                Header::new("Expires", DEFAULT_EXPIRES_SECS.to_string()),
            ],
        )
        .await
}
