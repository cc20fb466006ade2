//! Remote configuration fan-out proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     PUT /api/v2/config/{services}
//!     { "key": "Writable.LogLevel", "value": "DEBUG" }
//!            │
//!            ▼
//!     ┌─────────────┐     ┌──────────────┐     ┌──────────────────────┐
//!     │    http     │────▶│ orchestrator │────▶│ executor (×services) │
//!     │  + api      │     │   fan-out    │     │ session → exists? →  │
//!     └─────────────┘     └──────────────┘     │ put                  │
//!            ▲                   │             └──────────┬───────────┘
//!            │                   ▼                        ▼
//!     { "configuration":   ResultSet              registry (Consul KV)
//!       { svc: {success,
//!               description} } }
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use config_fanout_proxy::config::ConfigWatcher;
use config_fanout_proxy::lifecycle::{signals, startup};
use config_fanout_proxy::observability::{logging, metrics};
use config_fanout_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "config-fanout-proxy")]
#[command(about = "Applies one configuration change to many services", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = startup::startup_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("config-fanout-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        registry = %config.registry.url(),
        mode = ?config.fanout.mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
