#![doc = include_str!("../README.md")]

mod server;

use anyhow::Context;
use clap::Parser;
use core::time::Duration;
use server::config::{CliArgs, ServerConfig};
use server::service::{
    routes::router,
    state::{AppState, load_catalog},
    store::AnyStore,
};
use server::telemetry::init_telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;
    let result = run(config).await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "server exited with an error");
    }
    providers.shutdown();
    result
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let store = AnyStore::connect(&config.store)
        .await
        .context("failed to connect to the draw store")?;
    let catalog = load_catalog(config.catalog_path.as_deref())?;
    let backend = store.backend();
    let state = AppState::new(store, catalog, config.draw.clone(), config.max_entries);

    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&config, backend);

    let signalled = Arc::new(Notify::new());
    let serve = {
        let signalled = Arc::clone(&signalled);
        async move {
            axum::serve(listener, router(state))
                .with_graceful_shutdown(async move {
                    shutdown_signal().await;
                    signalled.notify_one();
                })
                .await
        }
    };

    tokio::select! {
        res = serve => res?,
        () = drain_deadline(&signalled, config.shutdown_timeout) => {
            tracing::warn!(
                timeout = ?config.shutdown_timeout,
                "in-flight requests did not finish in time; shutting down anyway"
            );
        }
    }

    tracing::info!("Service shut down successfully");
    Ok(())
}

/// Resolves `timeout` after the shutdown signal fired.
async fn drain_deadline(signalled: &Notify, timeout: Duration) {
    signalled.notified().await;
    tokio::time::sleep(timeout).await;
}

fn log_startup_info(config: &ServerConfig, backend: &str) {
    tracing::info!(
        addr = %config.server_addr,
        store = backend,
        store_timeout = ?config.draw.store_timeout,
        max_entries = config.max_entries,
        catalog_selection = config.draw.catalog_selection,
        "Starting draw service"
    );
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
}
