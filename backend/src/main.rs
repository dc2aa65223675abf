//! Main entry point for the RecipeHub catalog backend.
//!
//! This file initializes logging, loads the configuration and the recipe
//! catalog, and serves the API routes until the process is asked to stop.

mod api;
mod config;
mod errors;
mod middleware;
mod services;

use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config::BackendConfig;
use services::Catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BackendConfig::load().context("failed to load configuration")?;

    let catalog = Catalog::load(&config.recipes_path)
        .with_context(|| format!("failed to load {}", config.recipes_path.display()))?;
    if catalog.is_empty() {
        warn!(path = %config.recipes_path.display(), "catalog is empty");
    } else {
        info!(recipes = catalog.len(), "catalog loaded");
    }

    let app = api::router(Arc::new(catalog));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
