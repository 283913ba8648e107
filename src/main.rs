//! Asset Cache - A bounded, time- and memory-aware key/value cache
//!
//! Host binary: composes one cache instance and serves the admin API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use asset_cache::api::create_router;
use asset_cache::cache::FileStorage;
use asset_cache::{spawn_sweep_task, AppState, AssetCache, Config};

/// Main entry point for the asset cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache, restoring the snapshot file if usable
/// 4. Start background TTL sweep task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asset_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Asset Cache Server");

    let config = Config::from_env().context("invalid cache configuration")?;
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}s, max_memory_bytes={}, port={}, sweep_interval={}s",
        config.cache.max_entries,
        config.cache.default_ttl.as_secs(),
        config.cache.max_memory_bytes,
        config.server_port,
        config.cache.sweep_interval.as_secs()
    );

    let storage = Arc::new(FileStorage::new(&config.snapshot_path));
    let cache: AssetCache<Value> = AssetCache::with_storage(config.cache.clone(), storage)?;
    info!(
        entries = cache.len(),
        snapshot = %config.snapshot_path.display(),
        "Cache initialized"
    );

    let sweep_handle = spawn_sweep_task(cache.clone(), config.cache.sweep_interval);
    info!("Background sweep task started");

    let app = create_router(AppState::new(cache.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    cache.flush();
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweep_handle.abort();
    warn!("Sweep task aborted");
}
