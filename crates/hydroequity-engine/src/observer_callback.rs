//! Tick callback that updates the Observer API state.
//!
//! After each tick or paused preview, this callback replaces the latest
//! snapshot and history in the shared [`AppState`] and broadcasts the
//! snapshot to connected `WebSocket` clients.

use std::sync::Arc;

use hydroequity_core::runner::TickCallback;
use hydroequity_core::simulation::Simulation;
use hydroequity_observer::state::AppState;
use hydroequity_types::TickSnapshot;
use tracing::debug;

/// Callback that bridges the tick loop to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Replace the served view, then broadcast.
    ///
    /// Waits for REST readers to release the view. While paused the runner
    /// publishes once per command batch and then sleeps, so a skipped
    /// update would stay stale until the next resume.
    async fn publish(&self, snapshot: &TickSnapshot, simulation: &Simulation) {
        let history = simulation.history().records();
        {
            let mut view = self.state.snapshot.write().await;
            view.latest = Some(snapshot.clone());
            view.history = history;
        }

        let receivers = self.state.broadcast(snapshot);
        debug!(tick = snapshot.tick, hour = snapshot.hour, receivers, "Snapshot published");
    }
}

impl TickCallback for ObserverCallback {
    async fn on_tick(&mut self, snapshot: &TickSnapshot, simulation: &Simulation) {
        self.publish(snapshot, simulation).await;
    }

    async fn on_preview(&mut self, snapshot: &TickSnapshot, simulation: &Simulation) {
        self.publish(snapshot, simulation).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use hydroequity_core::config::SimulationConfig;
    use hydroequity_types::Scenario;

    use super::*;

    fn setup() -> (Simulation, Arc<AppState>, ObserverCallback) {
        let simulation = Simulation::from_config(&SimulationConfig::default()).unwrap();
        let state = Arc::new(AppState::new(simulation.registry().to_catalog()));
        let callback = ObserverCallback::new(Arc::clone(&state));
        (simulation, state, callback)
    }

    #[tokio::test]
    async fn tick_updates_latest_and_history() {
        let (mut simulation, state, mut callback) = setup();

        for _ in 0..2 {
            let snapshot = simulation.step().unwrap();
            callback.on_tick(&snapshot, &simulation).await;
        }

        let view = state.snapshot.read().await;
        assert_eq!(view.latest.as_ref().map(|s| s.tick), Some(1));
        assert_eq!(view.history.len(), 2);
    }

    #[tokio::test]
    async fn preview_replaces_latest_without_history() {
        let (mut simulation, state, mut callback) = setup();

        simulation.set_scenario(Scenario::Drought);
        let preview = simulation.preview().unwrap();
        callback.on_preview(&preview, &simulation).await;

        let view = state.snapshot.read().await;
        let latest = view.latest.as_ref().unwrap();
        assert_eq!(latest.scenario, Scenario::Drought);
        assert_eq!(latest.tick, 0);
        assert!(view.history.is_empty());
    }

    #[tokio::test]
    async fn tick_is_broadcast() {
        let (mut simulation, state, mut callback) = setup();
        let mut rx = state.subscribe();

        let snapshot = simulation.step().unwrap();
        callback.on_tick(&snapshot, &simulation).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.hour, snapshot.hour);
        assert_eq!(received.demands.len(), 10);
    }

    #[tokio::test]
    async fn paused_reset_lands_after_reader_releases_view() {
        let (mut simulation, state, mut callback) = setup();
        for _ in 0..5 {
            let snapshot = simulation.step().unwrap();
            callback.on_tick(&snapshot, &simulation).await;
        }

        // A REST reader holds the view while the paused runner applies a reset.
        let reader = state.snapshot.read().await;
        simulation.reset();
        let preview = simulation.preview().unwrap();
        let release = async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(reader);
        };
        tokio::join!(callback.on_preview(&preview, &simulation), release);

        let view = state.snapshot.read().await;
        assert!(view.history.is_empty());
        assert_eq!(view.latest.as_ref().map(|s| (s.tick, s.hour)), Some((0, 0)));
    }
}
