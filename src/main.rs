//! Custom model relay server.
//!
//! ```text
//!   POST /api/chat/custom {"customModelId": "...", ...}
//!        │
//!        ▼
//!   ┌─────────┐   get_by_id(models, id)   ┌──────────────┐
//!   │  relay  │──────────────────────────▶│ record store │
//!   │ handler │◀──────── base_url ────────│  (PostgREST) │
//!   └────┬────┘                           └──────────────┘
//!        │ POST base_url (same JSON)
//!        ▼
//!   ┌──────────────┐
//!   │ model        │  raw text → 200 application/json
//!   │ endpoint     │  failure  → error envelope
//!   └──────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use model_relay::config::{self, RelayConfig};
use model_relay::lifecycle::{signals, Shutdown};
use model_relay::observability::{logging, metrics};
use model_relay::{store, RelayServer};

#[derive(Parser)]
#[command(name = "model-relay")]
#[command(about = "Relays chat requests to per-model endpoints resolved from a record store", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults plus environment are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config: RelayConfig = config::load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        if let Err(errors) = config::validation::validate_config(&config) {
            return Err(config::ConfigError::Validation(errors).into());
        }
    }

    logging::init_logging(&config.observability);
    tracing::info!("model-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        store_backend = ?config.store.backend,
        table = %config.store.table,
        status_mode = ?config.errors.status_mode,
        accept_invalid_certs = config.upstream.accept_invalid_certs,
        upstream_timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let store = store::from_config(&config.store)?;
    let shutdown = Shutdown::new();
    signals::forward_signals(shutdown.clone());

    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let tls_enabled = config.listener.tls.is_some();
    let server = RelayServer::new(config, store)?;

    if tls_enabled {
        server.run_tls(addr, shutdown.signal()).await?;
    } else {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(address = %listener.local_addr()?, "Listening for connections");
        server.run(listener, shutdown.signal()).await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
