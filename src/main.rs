//! Subdomain Reverse Proxy
//!
//! # Architecture Overview
//!
//! ```text
//!     POST / {name, source}        ┌──────────────┐
//!     ────────────────────────────▶│ route table  │
//!                                  └──────┬───────┘
//!                                         │ find(leftmost label)
//!     blog.example.com/posts/1     ┌──────▼───────┐     ┌──────────┐
//!     ────────────────────────────▶│   router     │────▶│ forwarder│────▶ origin
//!                                  └──────────────┘     └──────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use subdomain_proxy::config::resolve_config;
use subdomain_proxy::lifecycle::{signals, Shutdown};
use subdomain_proxy::observability::{logging, metrics};
use subdomain_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "subdomain-proxy")]
#[command(about = "Dynamic subdomain-keyed reverse proxy", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configured bind address.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(args.config.as_deref(), args.port)?;

    logging::init(&config.observability);
    tracing::info!("subdomain-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        subdomain_offset = config.routing.subdomain_offset,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
