use anyhow::{Context, Result};
use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// Waits for a stop signal, then lets in-flight requests finish within `grace`.
pub(crate) async fn watch(handle: Handle<SocketAddr>, grace: Duration) {
    match stop_requested().await {
        Ok(signal) => {
            info!(signal, grace_seconds = grace.as_secs(), "Draining connections");
            handle.graceful_shutdown(Some(grace));
        },
        Err(e) => error!(error = %e, "Cannot listen for shutdown signals"),
    }
}

/// Resolves with the name of the first signal received: SIGINT (Ctrl+C) or SIGTERM.
async fn stop_requested() -> Result<&'static str> {
    let ctrl_c = async {
        signal::ctrl_c().await.context("Failed to install Ctrl+C handler")?;
        Ok::<_, anyhow::Error>("SIGINT")
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>("SIGTERM")
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<&'static str>>();

    tokio::select! {
        received = ctrl_c => received,
        received = terminate => received,
    }
}
