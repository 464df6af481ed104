//! Integration tests for the Observer API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hydroequity_core::config::{SimulationBoundsConfig, SimulationConfig};
use hydroequity_core::operator::{OperatorCommand, OperatorState};
use hydroequity_core::simulation::Simulation;
use hydroequity_observer::router::build_router;
use hydroequity_observer::state::AppState;
use hydroequity_types::{HistoryRecord, Scenario};
use serde_json::Value;
use tower::ServiceExt;

fn make_simulation() -> Simulation {
    Simulation::from_config(&SimulationConfig::default()).unwrap()
}

/// State with three published ticks and no operator attached.
async fn make_test_state() -> Arc<AppState> {
    let mut simulation = make_simulation();
    let state = Arc::new(AppState::new(simulation.registry().to_catalog()));

    for _ in 0..3 {
        let snapshot = simulation.step().unwrap();
        let mut view = state.snapshot.write().await;
        view.history = simulation.history().records();
        view.latest = Some(snapshot);
    }

    state
}

fn make_operator_state() -> (Arc<AppState>, Arc<OperatorState>) {
    let simulation = make_simulation();
    let operator = Arc::new(OperatorState::new(1000, &SimulationBoundsConfig::default()));
    let state = Arc::new(AppState::with_operator(
        simulation.registry().to_catalog(),
        Arc::clone(&operator),
    ));
    (state, operator)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_owned()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

// =========================================================================
// Read-only endpoints
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let router = build_router(make_test_state().await);

    let response = router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Hydroequity Observer"));
    assert!(html.contains("10 sectors"));
}

#[tokio::test]
async fn test_snapshot_is_404_before_first_tick() {
    let router = build_router(Arc::new(AppState::default()));

    let response = router.oneshot(get("/api/snapshot")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_snapshot_after_ticks() {
    let router = build_router(make_test_state().await);

    let response = router.oneshot(get("/api/snapshot")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["tick"], 2);
    assert_eq!(json["hour"], 2);
    assert_eq!(json["scenario"], "normal");
    assert_eq!(json["demands"].as_array().unwrap().len(), 10);
    assert_eq!(json["sectors"].as_array().unwrap().len(), 10);
    assert!(json["baseline_metrics"]["equity_index"].is_number());
}

#[tokio::test]
async fn test_history_returns_all_records() {
    let router = build_router(make_test_state().await);

    let response = router.oneshot(get("/api/history")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let records: Vec<HistoryRecord> =
        serde_json::from_value(body_to_json(response.into_body()).await).unwrap();
    let hours: Vec<u8> = records.iter().map(|r| r.hour).collect();
    assert_eq!(hours, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_history_limit_keeps_most_recent() {
    let router = build_router(make_test_state().await);

    let response = router.oneshot(get("/api/history?limit=2")).await.unwrap();
    let records: Vec<HistoryRecord> =
        serde_json::from_value(body_to_json(response.into_body()).await).unwrap();
    let hours: Vec<u8> = records.iter().map(|r| r.hour).collect();
    assert_eq!(hours, vec![1, 2]);
}

#[tokio::test]
async fn test_network_catalog() {
    let router = build_router(make_test_state().await);

    let response = router.oneshot(get("/api/network")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["sectors"].as_array().unwrap().len(), 10);
    assert!(!json["sources"].as_array().unwrap().is_empty());
    assert!(!json["plants"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let router = build_router(make_test_state().await);
    let response = router.oneshot(get("/api/agents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =========================================================================
// Operator endpoints
// =========================================================================

#[tokio::test]
async fn test_operator_unavailable_without_state() {
    let router = build_router(make_test_state().await);

    let response = router.oneshot(post_empty("/api/operator/pause")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 503);
}

#[tokio::test]
async fn test_pause_then_status_reports_paused() {
    let (state, operator) = make_operator_state();

    let response = build_router(Arc::clone(&state))
        .oneshot(post_empty("/api/operator/pause"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["ok"], true);
    assert!(operator.is_paused());

    let response = build_router(state)
        .oneshot(get("/api/operator/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["paused"], true);
    assert_eq!(json["tick"], 0);
    assert_eq!(json["scenario"], "normal");
    assert_eq!(json["trained"], false);
    assert_eq!(json["tick_interval_ms"], 1000);
    assert_eq!(json["pending_commands"], 0);
    assert!(json["end_reason"].is_null());
}

#[tokio::test]
async fn test_resume_clears_pause() {
    let (state, operator) = make_operator_state();
    operator.pause();

    let response = build_router(state)
        .oneshot(post_empty("/api/operator/resume"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!operator.is_paused());
}

#[tokio::test]
async fn test_speed_change() {
    let (state, operator) = make_operator_state();

    let response = build_router(state)
        .oneshot(post_json("/api/operator/speed", r#"{"tick_interval_ms": 250}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["previous_interval_ms"], 1000);
    assert_eq!(json["new_interval_ms"], 250);
    assert_eq!(operator.tick_interval_ms(), 250);
}

#[tokio::test]
async fn test_speed_below_minimum_is_rejected() {
    let (state, operator) = make_operator_state();

    let response = build_router(state)
        .oneshot(post_json("/api/operator/speed", r#"{"tick_interval_ms": 10}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(operator.tick_interval_ms(), 1000);
}

#[tokio::test]
async fn test_scenario_change_is_queued() {
    let (state, operator) = make_operator_state();

    let response = build_router(state)
        .oneshot(post_json("/api/operator/scenario", r#"{"scenario": "drought"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["scenario"], "drought");

    let commands = operator.drain_commands().await;
    assert_eq!(commands, vec![OperatorCommand::SetScenario(Scenario::Drought)]);
}

#[tokio::test]
async fn test_unknown_scenario_falls_back_to_normal() {
    let (state, operator) = make_operator_state();

    let response = build_router(state)
        .oneshot(post_json("/api/operator/scenario", r#"{"scenario": "monsoon"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["scenario"], "normal");

    let commands = operator.drain_commands().await;
    assert_eq!(commands, vec![OperatorCommand::SetScenario(Scenario::Normal)]);
}

#[tokio::test]
async fn test_reset_train_retrain_are_queued_in_order() {
    let (state, operator) = make_operator_state();

    for uri in [
        "/api/operator/train",
        "/api/operator/retrain",
        "/api/operator/reset",
    ] {
        let response = build_router(Arc::clone(&state))
            .oneshot(post_empty(uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(operator.pending_commands().await, 3);
    let commands = operator.drain_commands().await;
    assert_eq!(
        commands,
        vec![
            OperatorCommand::Train,
            OperatorCommand::Retrain,
            OperatorCommand::Reset,
        ]
    );
}

#[tokio::test]
async fn test_stop_sets_flag() {
    let (state, operator) = make_operator_state();

    let response = build_router(state)
        .oneshot(post_empty("/api/operator/stop"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(operator.is_stop_requested());
}

// =========================================================================
// Broadcast
// =========================================================================

#[tokio::test]
async fn test_broadcast_reaches_subscribers() {
    let state = AppState::default();
    let mut rx = state.subscribe();

    let snapshot = make_simulation().step().unwrap();
    assert_eq!(state.broadcast(&snapshot), 1);

    let received = rx.recv().await.unwrap();
    assert_eq!(received.tick, snapshot.tick);
}

#[test]
fn test_broadcast_without_subscribers_is_not_an_error() {
    let state = AppState::default();
    let snapshot = make_simulation().step().unwrap();
    assert_eq!(state.broadcast(&snapshot), 0);
}
