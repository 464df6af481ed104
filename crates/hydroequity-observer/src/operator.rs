//! Operator REST API handlers for runtime simulation control.
//!
//! Flag changes (pause, resume, speed, stop) take effect immediately on
//! the shared operator state. Changes to the simulation itself (scenario,
//! reset, train, retrain) are queued and applied by the runner before its
//! next tick, or straight away while paused.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/pause` | Pause the tick loop |
//! | `POST` | `/api/operator/resume` | Resume the tick loop |
//! | `POST` | `/api/operator/speed` | Set tick interval (ms) |
//! | `POST` | `/api/operator/scenario` | Switch the supply scenario |
//! | `POST` | `/api/operator/reset` | Return to hour 0, clear history |
//! | `POST` | `/api/operator/train` | Train the equity allocator |
//! | `POST` | `/api/operator/retrain` | Re-initialize weights and train |
//! | `GET` | `/api/operator/status` | Current simulation status |
//! | `POST` | `/api/operator/stop` | Trigger clean shutdown |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use hydroequity_core::config::resolve_scenario;
use hydroequity_core::operator::{OperatorCommand, OperatorState, SimulationStatus};
use hydroequity_types::Scenario;
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New tick interval in milliseconds (minimum 100).
    pub tick_interval_ms: u64,
}

/// Request body for `POST /api/operator/scenario`.
#[derive(Debug, serde::Deserialize)]
pub struct SetScenarioRequest {
    /// Scenario name. Unknown names resolve to `normal`.
    pub scenario: String,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
}

fn respond(message: impl Into<String>) -> Json<OperatorResponse> {
    Json(OperatorResponse {
        ok: true,
        message: message.into(),
    })
}

fn operator(state: &AppState) -> Result<&Arc<OperatorState>, ObserverError> {
    state
        .operator_state
        .as_ref()
        .ok_or(ObserverError::OperatorUnavailable)
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Pause the simulation tick loop.
///
/// Queued commands keep being applied while paused.
pub async fn pause(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.pause();
    Ok(respond("Simulation paused"))
}

/// Resume the simulation tick loop after a pause.
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.resume();
    Ok(respond("Simulation resumed"))
}

/// Change the tick interval at runtime.
///
/// The new interval takes effect before the next tick's sleep. Minimum
/// 100ms to prevent runaway ticks.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;

    let prev = operator
        .set_tick_interval_ms(body.tick_interval_ms)
        .ok_or_else(|| {
            ObserverError::InvalidRequest("tick_interval_ms must be at least 100".to_owned())
        })?;
    info!(previous_ms = prev, new_ms = body.tick_interval_ms, "Tick interval changed");

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Tick interval changed from {prev}ms to {}ms", body.tick_interval_ms),
        "previous_interval_ms": prev,
        "new_interval_ms": body.tick_interval_ms,
    })))
}

/// Trigger a clean simulation shutdown.
///
/// The HTTP server keeps running so the last snapshot and history stay
/// queryable.
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.request_stop();
    Ok(respond("Stop requested: simulation will end before the next tick"))
}

// ---------------------------------------------------------------------------
// Queued commands
// ---------------------------------------------------------------------------

/// Switch the supply scenario.
pub async fn set_scenario(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetScenarioRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;
    let scenario = resolve_scenario(&body.scenario);

    operator.enqueue(OperatorCommand::SetScenario(scenario)).await;
    info!(%scenario, "Scenario change queued");

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Scenario '{scenario}' queued"),
        "scenario": scenario,
    })))
}

/// Return the simulation to hour 0 and clear the history.
pub async fn reset(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.enqueue(OperatorCommand::Reset).await;
    Ok(respond("Reset queued"))
}

/// Train the equity allocator on the representative snapshot.
///
/// A no-op once trained unless retraining is enabled in configuration.
pub async fn train(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.enqueue(OperatorCommand::Train).await;
    Ok(respond("Training queued"))
}

/// Re-initialize the allocator weights and train from scratch.
pub async fn retrain(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.enqueue(OperatorCommand::Retrain).await;
    Ok(respond("Retraining queued"))
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Return the current simulation status: position in time, scenario,
/// training state, and control flags.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let operator = operator(&state)?;

    let (tick, hour, scenario, trained) = {
        let snapshot = state.snapshot.read().await;
        snapshot.latest.as_ref().map_or(
            (0, 0, Scenario::default(), false),
            |latest| (latest.tick, latest.hour, latest.scenario, latest.trained),
        )
    };

    let status = SimulationStatus {
        tick,
        hour,
        scenario,
        trained,
        paused: operator.is_paused(),
        stop_requested: operator.is_stop_requested(),
        tick_interval_ms: operator.tick_interval_ms(),
        elapsed_seconds: operator.elapsed_seconds(),
        max_ticks: operator.max_ticks(),
        max_real_time_seconds: operator.max_real_time_seconds(),
        pending_commands: operator.pending_commands().await,
        end_reason: operator.end_reason().await,
        started_at: operator.started_at().to_rfc3339(),
    };

    Ok(Json(status))
}
