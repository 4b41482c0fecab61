//! CloudEvents receiver.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌───────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ server ──▶ extract ──▶ HttpBinding          │
//!                           │                          │  detect mode      │
//!                           │                          ├─▶ unmarshaller    │
//!                           │                          └─▶ structured codec│
//!     Client Response       │                                 │             │
//!     ◀─────────────────────┼── echo in arrival mode ◀────────┘             │
//!                           │                                               │
//!                           │  config (TOML) · logging · metrics           │
//!                           └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use cloudevents_http::config::{load_config, AppConfig};
use cloudevents_http::http::{EventServer, HttpBinding};
use cloudevents_http::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "cloudevents-http")]
#[command(about = "Receive CloudEvents over HTTP and echo them back", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("cloudevents-http v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        binary_content_type = %config.binding.binary_content_type,
        structured_content_type = %config.binding.structured_content_type,
        header_prefix = %config.binding.header_prefix,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let binding = Arc::new(HttpBinding::from_config(&config.binding)?);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = EventServer::new(config.server.clone(), binding);
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
