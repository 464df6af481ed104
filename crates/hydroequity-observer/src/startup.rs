//! Observer server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] launches the HTTP + `WebSocket` server on a
//! background Tokio task so the API runs concurrently with the tick loop.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, start_server};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// Binds to `0.0.0.0:{port}`. The returned [`JoinHandle`] lets the caller
/// keep the server alive after the simulation ends, or abort it.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is malformed. Bind
/// failures surface later in the task's log output.
pub fn spawn_observer(port: u16, state: Arc<AppState>) -> Result<JoinHandle<()>, StartupError> {
    let config = ServerConfig {
        host: String::from("0.0.0.0"),
        port,
    };
    config.socket_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = start_server(&config, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(port, "Observer server spawned on background task");

    Ok(handle)
}
