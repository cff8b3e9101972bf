//! Periodic status forwarding.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ctx_sip_core::types::Address;

use crate::agent::UserAgent;
use crate::store::AggregateStore;

/// Ships the aggregate store to the sink on a fixed cadence.
///
/// Each cycle drains the store in one swap, formats the batch and sends
/// it as a single MESSAGE. The drain happens before any I/O, so updates
/// arriving mid-send land in the next cycle. Delivery failures drop the
/// batch; there is no redelivery.
pub struct Forwarder {
    store: Arc<AggregateStore>,
    agent: Arc<UserAgent>,
    sink: Address,
    interval: Duration,
}

impl Forwarder {
    pub fn new(
        store: Arc<AggregateStore>,
        agent: Arc<UserAgent>,
        sink: Address,
        interval: Duration,
    ) -> Forwarder {
        Forwarder {
            store,
            agent,
            sink,
            interval,
        }
    }

    /// Spawns the forwarding loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // the immediate first tick is harmless: the store starts empty
            loop {
                ticker.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// One cycle: drain, format, send. An empty store produces no
    /// network activity at all.
    pub async fn run_cycle(&self) {
        let batch = self.store.drain();
        if batch.is_empty() {
            return;
        }

        debug!(entries = batch.len(), "forwarding status snapshot");
        let body = format_snapshot(&batch);
        if let Err(e) = self.agent.send_text(&self.sink, body).await {
            warn!(error = %e, "failed to forward status snapshot");
        }
    }
}

/// One `reporter:status` line per entry, sorted for a stable wire form.
fn format_snapshot(batch: &HashMap<String, String>) -> String {
    let mut lines: Vec<String> = batch
        .iter()
        .map(|(reporter, status)| format!("{reporter}:{status}"))
        .collect();
    lines.sort();
    lines.join("\n")
}
