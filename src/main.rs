//! dashsrv - environmental sensor dashboard service

use clap::Parser;
use dashsrv::api::{create_router, ApiState};
use dashsrv::config::Config;
use dashsrv::pipeline::SourceDescriptor;
use dashsrv::store::{ReadingStore, SqlStore};
use dashsrv::{SERVICE_NAME, SERVICE_VERSION};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(name = "dashsrv", version, about = "Environmental sensor dashboard service")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(
        short,
        long,
        default_value = "config/dashsrv.yaml",
        env = "DASHSRV_CONFIG"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    tracing::info!(
        "Starting {} v{} - {} sources, listening on port {}",
        SERVICE_NAME,
        SERVICE_VERSION,
        config.sources.len(),
        config.service.listen_port
    );

    // One lazily-connected pool per configured store. A store that is
    // down at startup degrades to empty chart series instead of
    // failing boot.
    let tz = config.location.timezone;
    let mut stores: HashMap<String, Arc<SqlStore>> = HashMap::new();
    for (name, url) in &config.stores {
        stores.insert(name.clone(), Arc::new(SqlStore::connect_lazy(url, tz)?));
    }

    // Reachability check in the background; a failure here is logged,
    // not fatal, since queries degrade to empty series.
    for (name, store) in &stores {
        let name = name.clone();
        let store = store.clone();
        tokio::spawn(async move {
            match store.ping().await {
                Ok(()) => tracing::info!("Store '{}' is reachable", name),
                Err(e) => tracing::warn!("Store '{}' is not reachable: {}", name, e),
            }
        });
    }

    let sources = config
        .sources
        .iter()
        .map(|source| {
            let store = stores.get(&source.store).cloned().ok_or_else(|| {
                anyhow::anyhow!("Source '{}' references unknown store", source.label)
            })?;
            Ok(SourceDescriptor {
                label: source.label.clone(),
                table: source.table.clone(),
                emphasis: source.emphasis,
                store: store as Arc<dyn ReadingStore>,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let state = ApiState {
        sources: Arc::new(sources),
        config: Arc::new(config.clone()),
    };
    let app = create_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.service.listen_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Pools are closed after the server stops accepting connections.
    for store in stores.values() {
        store.close().await;
    }

    tracing::info!("{} stopped", SERVICE_NAME);
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Initialize the logging system
fn init_logging() {
    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("{}=info", env!("CARGO_PKG_NAME")));

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
