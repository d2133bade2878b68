//! Launch the overlay server alongside the garden driver.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors from spawning the overlay server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server could not be started.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the overlay HTTP + `WebSocket` server on a background task.
///
/// The address is validated before spawning so an obvious misconfiguration
/// fails startup instead of a background log line. The caller holds the
/// handle and aborts or awaits it on shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is invalid.
pub fn spawn_overlay(
    config: ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = config.addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "overlay server exited with error");
        }
    });

    tracing::info!(%addr, "overlay server spawned on background task");

    Ok(handle)
}
