//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Bounded simulation**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Pause/resume**: the loop stops ticking but still applies queued
//!   commands, publishing a preview after each batch
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **Queued commands**: scenario, reset, train, and retrain requests are
//!   applied between ticks, never during one
//! - **Operator stop**: clean stop via REST API
//!
//! The runner wraps [`Simulation::step`] and adds the control plane around
//! it.

use std::future::{self, Future};
use std::sync::Arc;

use hydroequity_types::TickSnapshot;
use tracing::{info, warn};

use crate::operator::{OperatorCommand, OperatorState, SimulationEndReason};
use crate::simulation::{Simulation, SimulationError, TrainOutcome};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A simulation pass or command failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick snapshot, if any tick completed.
    pub final_snapshot: Option<TickSnapshot>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked as snapshots are produced.
///
/// Implementations can use this to update the observer state and
/// broadcast snapshots. The runner awaits each call before moving on, so
/// a publish is never dropped, including the single preview published
/// while paused.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(
        &mut self,
        snapshot: &TickSnapshot,
        simulation: &Simulation,
    ) -> impl Future<Output = ()> + Send;

    /// Called with a preview snapshot after commands are applied while
    /// paused. The clock and history have not moved.
    fn on_preview(
        &mut self,
        _snapshot: &TickSnapshot,
        _simulation: &Simulation,
    ) -> impl Future<Output = ()> + Send {
        future::ready(())
    }
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(
        &mut self,
        _snapshot: &TickSnapshot,
        _simulation: &Simulation,
    ) -> impl Future<Output = ()> + Send {
        future::ready(())
    }
}

/// Run the simulation loop until a termination condition is met.
///
/// # Arguments
///
/// * `simulation` - The simulation; the runner is its only mutator
/// * `operator` - Shared operator control state
/// * `callback` - Called after each tick and each paused preview
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick or command fails unrecoverably.
pub async fn run_simulation(
    simulation: &mut Simulation,
    operator: &Arc<OperatorState>,
    callback: &mut impl TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_snapshot: Option<TickSnapshot> = None;
    let mut total_ticks: u64 = 0;
    let mut was_paused = false;

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        scenario = %simulation.scenario(),
        "Simulation starting"
    );

    loop {
        // --- Apply queued commands ---
        let applied = apply_commands(simulation, operator).await?;

        // --- Check stop request ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return Ok(finish(
                operator,
                SimulationEndReason::OperatorStop,
                last_snapshot,
                total_ticks,
            )
            .await);
        }

        // --- Check time limit ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            return Ok(finish(
                operator,
                SimulationEndReason::MaxRealTimeReached,
                last_snapshot,
                total_ticks,
            )
            .await);
        }

        // --- Paused: publish a preview of any changes, then wait ---
        if operator.is_paused() {
            if !was_paused {
                info!("Simulation paused");
                was_paused = true;
            }
            if applied > 0 {
                let preview = simulation.preview()?;
                callback.on_preview(&preview, simulation).await;
            }
            operator.wait_while_idle().await;
            continue;
        }
        if was_paused {
            info!("Simulation resumed");
            was_paused = false;
        }

        // --- Execute tick ---
        let snapshot = simulation.step()?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&snapshot, simulation).await;

        // --- Check tick limit ---
        if operator.tick_limit_reached(total_ticks) {
            info!(
                total_ticks,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return Ok(finish(
                operator,
                SimulationEndReason::MaxTicksReached,
                Some(snapshot),
                total_ticks,
            )
            .await);
        }

        last_snapshot = Some(snapshot);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Apply every queued command in order. Returns how many were applied.
async fn apply_commands(
    simulation: &mut Simulation,
    operator: &OperatorState,
) -> Result<usize, SimulationError> {
    let commands = operator.drain_commands().await;
    for command in &commands {
        match *command {
            OperatorCommand::SetScenario(scenario) => simulation.set_scenario(scenario),
            OperatorCommand::Reset => simulation.reset(),
            OperatorCommand::Train => log_training(simulation.train()?),
            OperatorCommand::Retrain => log_training(simulation.retrain()?),
        }
    }
    Ok(commands.len())
}

fn log_training(outcome: TrainOutcome) {
    match outcome {
        TrainOutcome::Trained(report) => info!(
            epochs = report.epochs,
            initial_spread = report.initial_spread,
            final_spread = report.final_spread,
            "Training command applied"
        ),
        TrainOutcome::AlreadyTrained => info!("Training command ignored: already trained"),
    }
}

async fn finish(
    operator: &OperatorState,
    reason: SimulationEndReason,
    final_snapshot: Option<TickSnapshot>,
    total_ticks: u64,
) -> SimulationResult {
    operator.set_end_reason(reason.clone()).await;
    SimulationResult {
        end_reason: reason,
        final_snapshot,
        total_ticks,
    }
}

/// Log the simulation end sequence.
///
/// This should be called after [`run_simulation`] returns. The HTTP server
/// should remain running after this returns.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_snapshot.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref snapshot) = result.final_snapshot {
        info!(
            tick = snapshot.tick,
            hour = snapshot.hour,
            scenario = %snapshot.scenario,
            baseline_equity = snapshot.baseline_metrics.equity_index,
            optimized_equity = snapshot.optimized_metrics.equity_index,
            "Final tick snapshot"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use hydroequity_types::Scenario;

    use super::*;
    use crate::config::{SimulationBoundsConfig, SimulationConfig};

    fn make_simulation(epochs: u32) -> Simulation {
        let mut config = SimulationConfig::default();
        config.training.epochs = epochs;
        Simulation::from_config(&config).unwrap()
    }

    fn operator(max_ticks: u64) -> Arc<OperatorState> {
        let bounds = SimulationBoundsConfig {
            max_ticks,
            max_real_time_seconds: 0,
        };
        Arc::new(OperatorState::new(0, &bounds))
    }

    #[derive(Default)]
    struct CountCallback {
        ticks: u64,
        previews: u64,
        last_scenario: Option<Scenario>,
    }

    impl TickCallback for CountCallback {
        fn on_tick(
            &mut self,
            snapshot: &TickSnapshot,
            _simulation: &Simulation,
        ) -> impl Future<Output = ()> + Send {
            self.ticks = self.ticks.saturating_add(1);
            self.last_scenario = Some(snapshot.scenario);
            future::ready(())
        }

        fn on_preview(
            &mut self,
            snapshot: &TickSnapshot,
            _simulation: &Simulation,
        ) -> impl Future<Output = ()> + Send {
            self.previews = self.previews.saturating_add(1);
            self.last_scenario = Some(snapshot.scenario);
            future::ready(())
        }
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut sim = make_simulation(10);
        let operator = operator(5);
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut sim, &operator, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_snapshot.map(|s| s.hour), Some(4));
        assert_eq!(
            operator.end_reason().await,
            Some(SimulationEndReason::MaxTicksReached)
        );
    }

    #[tokio::test]
    async fn operator_stop() {
        let mut sim = make_simulation(10);
        let operator = operator(0);
        operator.request_stop();
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut sim, &operator, &mut cb).await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_snapshot.is_none());
    }

    #[tokio::test]
    async fn tick_callback_is_called() {
        let mut sim = make_simulation(10);
        let operator = operator(3);
        let mut cb = CountCallback::default();

        let _ = run_simulation(&mut sim, &operator, &mut cb).await.unwrap();

        assert_eq!(cb.ticks, 3);
        assert_eq!(cb.previews, 0);
        assert_eq!(sim.history().len(), 3);
    }

    #[tokio::test]
    async fn queued_commands_apply_before_tick() {
        let mut sim = make_simulation(10);
        let operator = operator(1);
        operator
            .enqueue(OperatorCommand::SetScenario(Scenario::Drought))
            .await;
        operator.enqueue(OperatorCommand::Train).await;
        let mut cb = CountCallback::default();

        let result = run_simulation(&mut sim, &operator, &mut cb).await.unwrap();
        let snapshot = result.final_snapshot.unwrap();

        assert_eq!(snapshot.scenario, Scenario::Drought);
        assert!(snapshot.trained);
        assert!(!operator.has_pending_commands().await);
    }

    #[tokio::test]
    async fn reset_command_restarts_history() {
        let mut sim = make_simulation(10);
        for _ in 0..5 {
            let _ = sim.step().unwrap();
        }
        let operator = operator(1);
        operator.enqueue(OperatorCommand::Reset).await;

        let result = run_simulation(&mut sim, &operator, &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.final_snapshot.map(|s| s.hour), Some(0));
        assert_eq!(sim.history().len(), 1);
    }

    #[tokio::test]
    async fn paused_runner_applies_commands_and_previews() {
        let mut sim = make_simulation(10);
        let operator = operator(0);
        operator.pause();
        operator
            .enqueue(OperatorCommand::SetScenario(Scenario::Failure))
            .await;
        let mut cb = CountCallback::default();

        let stopper = {
            let operator = Arc::clone(&operator);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                operator.request_stop();
            }
        };
        let (result, ()) = tokio::join!(run_simulation(&mut sim, &operator, &mut cb), stopper);
        let result = result.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert_eq!(cb.ticks, 0);
        assert_eq!(cb.previews, 1);
        assert_eq!(cb.last_scenario, Some(Scenario::Failure));
        assert!(sim.history().is_empty());
        assert_eq!(sim.clock().tick(), 0);
    }

    #[tokio::test]
    async fn variable_speed_changes_interval() {
        let bounds = SimulationBoundsConfig::default();
        let operator = Arc::new(OperatorState::new(1000, &bounds));

        assert_eq!(operator.tick_interval_ms(), 1000);
        let _ = operator.set_tick_interval_ms(500);
        assert_eq!(operator.tick_interval_ms(), 500);
    }
}
