//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read from the in-memory [`SimulationSnapshot`] via the
//! shared [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/snapshot` | Latest tick snapshot |
//! | `GET` | `/api/history` | Rolling equity history (`?limit=N`) |
//! | `GET` | `/api/network` | Sources, treatment plants, and sectors |
//!
//! [`SimulationSnapshot`]: crate::state::SimulationSnapshot

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};

use crate::error::ObserverError;
use crate::state::AppState;

/// Query parameters for the `GET /api/history` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    /// Return at most this many of the most recent records.
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the current hour, scenario, equity
/// indices, and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let (tick, hour, scenario, baseline, optimized, trained) = snapshot.latest.as_ref().map_or_else(
        || (0, 0, String::from("-"), 0.0, 0.0, false),
        |latest| {
            (
                latest.tick,
                latest.hour,
                latest.scenario.to_string(),
                latest.baseline_metrics.equity_index,
                latest.optimized_metrics.equity_index,
                latest.trained,
            )
        },
    );
    let sector_count = snapshot.network.sectors.len();
    let model = if trained { "trained" } else { "untrained" };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Hydroequity Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Hydroequity Observer</h1>
    <p class="subtitle">Hourly water allocation across {sector_count} sectors</p>

    <div>
        <div class="metric">
            <div class="label">Tick</div>
            <div class="value">{tick}</div>
        </div>
        <div class="metric">
            <div class="label">Hour</div>
            <div class="value">{hour:02}:00</div>
        </div>
        <div class="metric">
            <div class="label">Scenario</div>
            <div class="value">{scenario}</div>
        </div>
        <div class="metric">
            <div class="label">Baseline equity</div>
            <div class="value">{baseline:.1}</div>
        </div>
        <div class="metric">
            <div class="label">Optimized equity ({model})</div>
            <div class="value">{optimized:.1}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/snapshot">/api/snapshot</a> -- Latest tick snapshot</li>
        <li>GET <a href="/api/history">/api/history</a> -- Rolling equity history</li>
        <li>GET <a href="/api/network">/api/network</a> -- Sources, plants, and sectors</li>
        <li>GET <a href="/api/operator/status">/api/operator/status</a> -- Simulation status</li>
        <li>POST /api/operator/{{pause,resume,stop,reset,train,retrain}}</li>
        <li>POST /api/operator/speed -- <code>{{"tick_interval_ms": 500}}</code></li>
        <li>POST /api/operator/scenario -- <code>{{"scenario": "drought"}}</code></li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/ticks</code> -- Live tick snapshot stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/snapshot
// ---------------------------------------------------------------------------

/// Return the most recent tick snapshot.
///
/// Responds 404 until the first tick (or paused preview) has been
/// published.
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    snapshot
        .latest
        .clone()
        .map(Json)
        .ok_or_else(|| ObserverError::NotFound("no tick has been computed yet".to_owned()))
}

// ---------------------------------------------------------------------------
// GET /api/history
// ---------------------------------------------------------------------------

/// Return the rolling equity history, oldest first.
///
/// # Query Parameters
///
/// - `limit`: keep only the most recent `limit` records
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let history = &snapshot.history;
    let skip = query
        .limit
        .map_or(0, |limit| history.len().saturating_sub(limit));
    let records: Vec<_> = history.iter().skip(skip).copied().collect();
    Json(records)
}

// ---------------------------------------------------------------------------
// GET /api/network
// ---------------------------------------------------------------------------

/// Return the network catalog: sources, treatment plants, and sectors.
pub async fn get_network(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    Json(snapshot.network.clone())
}
