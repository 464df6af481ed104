//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for tick snapshots and the
//! in-memory [`SimulationSnapshot`] that the REST endpoints serve.

use std::sync::Arc;

use hydroequity_core::operator::OperatorState;
use hydroequity_network::NetworkCatalog;
use hydroequity_types::{HistoryRecord, TickSnapshot};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel for tick snapshots.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// In-memory view of the simulation served by REST endpoints.
///
/// Replaced wholesale by the engine after each tick or preview.
#[derive(Debug, Clone, Default)]
pub struct SimulationSnapshot {
    /// The most recent tick or preview snapshot. `None` before the first tick.
    pub latest: Option<TickSnapshot>,
    /// Rolling equity history, oldest first.
    pub history: Vec<HistoryRecord>,
    /// The network catalog the simulation runs on.
    pub network: NetworkCatalog,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for tick snapshots.
    pub tx: broadcast::Sender<TickSnapshot>,
    /// The current simulation view (updated each tick).
    pub snapshot: Arc<RwLock<SimulationSnapshot>>,
    /// Shared operator control state (present when the simulation is running).
    pub operator_state: Option<Arc<OperatorState>>,
}

impl AppState {
    /// Create a new application state serving the given catalog.
    pub fn new(network: NetworkCatalog) -> Self {
        Self::build(network, None)
    }

    /// Create a new application state with operator control state attached.
    pub fn with_operator(network: NetworkCatalog, operator: Arc<OperatorState>) -> Self {
        Self::build(network, Some(operator))
    }

    fn build(network: NetworkCatalog, operator_state: Option<Arc<OperatorState>>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(SimulationSnapshot {
                latest: None,
                history: Vec::new(),
                network,
            })),
            operator_state,
        }
    }

    /// Subscribe to the tick broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<TickSnapshot> {
        self.tx.subscribe()
    }

    /// Publish a snapshot to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, snapshot: &TickSnapshot) -> usize {
        // send returns Err only when there are zero receivers.
        self.tx.send(snapshot.clone()).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(NetworkCatalog::default())
    }
}
