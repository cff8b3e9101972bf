//! Context server binary.
//!
//! Loads configuration (JSON file, then flag overrides), sets up
//! logging, starts the server and runs until Ctrl+C.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use ctx_presence_core::{ContextServer, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "ctx-server", version, about = "SIP presence aggregation bridge")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// UDP address to listen on (overrides the config file)
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Upstream proxy as host[:port] (overrides the config file)
    #[arg(long)]
    proxy: Option<String>,

    /// URI this server identifies itself as
    #[arg(long)]
    identity: Option<String>,

    /// Watched party URI; repeat for several parties
    #[arg(long = "watch")]
    watch: Vec<String>,

    /// URI aggregated snapshots are sent to
    #[arg(long)]
    sink: Option<String>,

    /// Milliseconds between forwarding cycles
    #[arg(long)]
    forward_interval_ms: Option<u64>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let level: Level = level
        .parse()
        .with_context(|| format!("invalid log level: {level}"))?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            ServerConfig::from_json(&raw)?
        }
        None => ServerConfig::default(),
    };

    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if let Some(proxy) = &cli.proxy {
        config.proxy = proxy.clone();
    }
    if let Some(identity) = &cli.identity {
        config.local_uri = identity.clone();
    }
    if !cli.watch.is_empty() {
        config.watched = cli.watch.clone();
    }
    if let Some(sink) = &cli.sink {
        config.sink_uri = sink.clone();
    }
    if let Some(interval) = cli.forward_interval_ms {
        config.forward_interval_ms = interval;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    info!("{} v{} starting", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let server = ContextServer::start(config).await?;
    info!(addr = %server.local_addr(), "listening; press Ctrl+C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    server.shutdown().await?;
    Ok(())
}
