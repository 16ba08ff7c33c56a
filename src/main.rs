//! Rewriting reverse proxy binary.
//!
//! ```text
//!   Client ──▶ /p/<token> ──▶ decode ──▶ outbound headers ──▶ Origin
//!                                                               │
//!   Client ◀── rewritten HTML/CSS or streamed bytes ◀── inbound headers
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use rewrite_proxy::config::{load_config, ProxyConfig};
use rewrite_proxy::lifecycle::{signals, startup, Shutdown};
use rewrite_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rewrite-proxy")]
#[command(about = "HTTP reverse proxy that rewrites pages to stay on the proxy", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("rewrite-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = ?config.rewrite.mode,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (server, listener) = startup::prepare(config).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
