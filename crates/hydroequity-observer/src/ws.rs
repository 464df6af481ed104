//! `WebSocket` stream of tick snapshots at `GET /ws/ticks`.
//!
//! A new client first receives the latest published snapshot, then every
//! tick and paused preview as JSON text frames. A paused simulation
//! publishes nothing until the next command, so without the first frame a
//! late client would sit on an empty screen.

use std::ops::ControlFlow;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use hydroequity_types::TickSnapshot;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming tick snapshots.
pub async fn ws_ticks(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_snapshots(socket, state))
}

/// Encode a snapshot as a JSON text frame.
fn snapshot_frame(snapshot: &TickSnapshot) -> Option<Message> {
    match serde_json::to_string(snapshot) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            warn!(tick = snapshot.tick, "Failed to serialize tick snapshot: {e}");
            None
        }
    }
}

/// Frame sent on connect: the snapshot currently served by the REST API.
/// `None` before the first tick.
async fn initial_frame(state: &AppState) -> Option<Message> {
    let view = state.snapshot.read().await;
    view.latest.as_ref().and_then(snapshot_frame)
}

async fn stream_snapshots(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the view so a publish in between is not lost.
    let mut rx = state.subscribe();

    let caught_up = match initial_frame(&state).await {
        Some(frame) => socket.send(frame).await.is_ok(),
        None => true,
    };
    if !caught_up {
        debug!("WebSocket client gone before the first frame");
        return;
    }
    debug!("WebSocket client connected");

    loop {
        let flow = tokio::select! {
            received = rx.recv() => forward(&mut socket, received).await,
            incoming = socket.recv() => answer(&mut socket, incoming).await,
        };
        if flow.is_break() {
            debug!("WebSocket session closed");
            return;
        }
    }
}

/// Relay one broadcast result to the client.
async fn forward(
    socket: &mut WebSocket,
    received: Result<TickSnapshot, RecvError>,
) -> ControlFlow<()> {
    match received {
        Ok(snapshot) => match snapshot_frame(&snapshot) {
            Some(frame) if socket.send(frame.clone()).await.is_err() => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        },
        Err(RecvError::Lagged(skipped)) => {
            debug!(skipped, "WebSocket client lagged, skipping ahead");
            ControlFlow::Continue(())
        }
        Err(RecvError::Closed) => ControlFlow::Break(()),
    }
}

/// Handle one frame from the client. Only pings get an answer.
async fn answer(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, axum::Error>>,
) -> ControlFlow<()> {
    match incoming {
        Some(Ok(Message::Ping(data))) if socket.send(Message::Pong(data.clone())).await.is_err() => {
            ControlFlow::Break(())
        }
        Some(Ok(Message::Close(_)) | Err(_)) | None => ControlFlow::Break(()),
        Some(Ok(_)) => ControlFlow::Continue(()),
    }
}
