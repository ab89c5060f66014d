//! Portal edge gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ listener ─▶ request id + trace + timeout
//!                                    │
//!                                    ▼
//!                             edge middleware ── redirect (307) ──▶ Client
//!                                    │
//!                        ┌───────────┴────────────┐
//!                        ▼                        ▼
//!                 /api/auth/* (local)     forward to upstream web app
//!                        │                        │
//!                  session store                  ▼
//!                                    response + Set-Cookie ──▶ Client
//!
//!     Cross-cutting: config (+ hot reload), logging, metrics,
//!     admin API, lifecycle (signals, graceful shutdown)
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use portal_edge::config::watcher::ConfigWatcher;
use portal_edge::error::GatewayError;
use portal_edge::lifecycle::{load_startup_config, wait_for_termination, Shutdown};
use portal_edge::observability::{logging, metrics};
use portal_edge::GatewayServer;

#[derive(Parser, Debug)]
#[command(author, version, about = "Edge gateway for the multi-role portal", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_startup_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("portal-edge: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "portal-edge starting");

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .map_err(|source| GatewayError::MetricsAddress {
                address: config.observability.metrics_address.clone(),
                source,
            })?;
        metrics::init_metrics(addr).map_err(GatewayError::from)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| GatewayError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // The watcher handle must outlive the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        None => (tokio::sync::mpsc::unbounded_channel().1, None),
    };

    let shutdown = std::sync::Arc::new(Shutdown::new());
    let server = GatewayServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_termination().await;
        signal_shutdown.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
