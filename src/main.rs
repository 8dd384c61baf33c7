//! Filter-chain API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ axum server ──▶ Gateway ──▶ route chain ─────────────────────────────▶ service
//!                                  │        access log → request id → CORS →         instance
//!                                  │        error translation → auth → retry → proxy
//!                                  │
//!                                  └──▶ /health, /error, 404 (global filters only)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use stream_gateway::config::load_config;
use stream_gateway::lifecycle::{wait_for_signal, Shutdown};
use stream_gateway::observability::{logging, metrics};
use stream_gateway::{Gateway, HttpServer};

#[derive(Debug, Parser)]
#[command(name = "stream-gateway", version, about = "Filter-chain API gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "gateway.toml")]
    config: PathBuf,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        max_concurrent_requests = config.listener.max_concurrent_requests,
        routes = config.routes.len(),
        services = config.services.len(),
        "Configuration loaded"
    );

    let gateway = Arc::new(Gateway::from_config(&config)?);
    if cli.check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::with_gateway(&config, gateway);
    let mut serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut serving => result??,
        _ = wait_for_signal() => {
            shutdown.trigger();
            serving.await??;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
