//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST, operator controls, `WebSocket`) into a
//! single [`Router`] with CORS enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/ticks` -- `WebSocket` tick snapshot stream
/// - `GET /api/snapshot` -- latest tick snapshot
/// - `GET /api/history` -- rolling equity history
/// - `GET /api/network` -- network catalog
/// - `GET /api/operator/status` -- simulation status
/// - `POST /api/operator/*` -- pause, resume, speed, scenario, reset,
///   train, retrain, stop
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/ticks", get(ws::ws_ticks))
        // REST API
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/history", get(handlers::get_history))
        .route("/api/network", get(handlers::get_network))
        // Operator controls
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/pause", post(operator::pause))
        .route("/api/operator/resume", post(operator::resume))
        .route("/api/operator/speed", post(operator::set_speed))
        .route("/api/operator/scenario", post(operator::set_scenario))
        .route("/api/operator/reset", post(operator::reset))
        .route("/api/operator/train", post(operator::train))
        .route("/api/operator/retrain", post(operator::retrain))
        .route("/api/operator/stop", post(operator::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
