//! Observer API server for the Hydroequity simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/ticks`) streaming every tick snapshot
//!   via [`tokio::sync::broadcast`]
//! - **REST endpoints** for the latest snapshot, the rolling equity
//!   history, and the network catalog
//! - **Operator REST endpoints** for runtime control (pause, resume,
//!   speed, scenario, reset, train, retrain, status, stop)
//! - **Minimal HTML status page** (`GET /`) showing the current hour,
//!   scenario, and equity indices
//!
//! # Architecture
//!
//! The observer reads from an in-memory [`SimulationSnapshot`] that the
//! engine updates after each tick. Reads never block the tick loop for
//! longer than a clone. Operator commands that change the simulation are
//! queued on the shared operator state and applied by the runner.
//!
//! [`SimulationSnapshot`]: state::SimulationSnapshot

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, SimulationSnapshot};
