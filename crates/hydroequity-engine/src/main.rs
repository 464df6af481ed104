//! Engine binary for the Hydroequity simulation.
//!
//! Wires together configuration, logging, the simulation, operator
//! controls, and the Observer API, then runs the hourly tick loop until a
//! termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hydroequity-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation (registry, demand generator, allocator)
//! 4. Train the equity allocator if `training.train_on_start` is set
//! 5. Create operator state from simulation bounds
//! 6. Start the Observer API server
//! 7. Run the simulation loop
//! 8. Log the result and keep serving until Ctrl-C

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;

use hydroequity_core::config::SimulationConfig;
use hydroequity_core::operator::OperatorState;
use hydroequity_core::runner;
use hydroequity_core::simulation::{Simulation, TrainOutcome};
use hydroequity_observer::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "hydroequity-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging depends on it, so this comes first.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("hydroequity-engine starting");
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        scenario = %config.scenario.resolve(),
        custom_network = config.network.is_some(),
        "Configuration loaded"
    );

    // 3. Build the simulation.
    let mut simulation = Simulation::from_config(&config)?;
    info!(
        sectors = simulation.registry().sector_count(),
        sources = simulation.registry().sources().len(),
        total_capacity = simulation.registry().total_capacity(),
        "Simulation initialized"
    );

    // 4. Optional startup training.
    if config.training.train_on_start {
        match simulation.train()? {
            TrainOutcome::Trained(report) => info!(
                epochs = report.epochs,
                initial_spread = report.initial_spread,
                final_spread = report.final_spread,
                "Startup training complete"
            ),
            TrainOutcome::AlreadyTrained => {}
        }
    }

    // 5. Create operator state.
    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    if config.world.start_paused {
        operator.pause();
    }
    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        paused = operator.is_paused(),
        "Operator state initialized"
    );

    // 6. Start Observer API server.
    let observer_port = config.infrastructure.observer_port;
    let app_state = Arc::new(AppState::with_operator(
        simulation.registry().to_catalog(),
        Arc::clone(&operator),
    ));
    let observer_handle =
        hydroequity_observer::startup::spawn_observer(observer_port, Arc::clone(&app_state))?;
    info!(port = observer_port, "Observer API server started");

    // 7. Run the simulation.
    let mut callback = ObserverCallback::new(app_state);
    let result = runner::run_simulation(&mut simulation, &operator, &mut callback).await?;

    // 8. Log results, then keep the last snapshot queryable.
    runner::log_simulation_end(&result);
    info!("Simulation finished; observer still serving, press Ctrl-C to exit");

    tokio::select! {
        joined = observer_handle => {
            if let Err(e) = joined {
                warn!(error = %e, "Observer task ended unexpectedly");
            }
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
        }
    }

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "hydroequity-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from [`CONFIG_PATH`].
///
/// A missing file is not an error: defaults are used, with the
/// `OBSERVER_PORT` override still applied.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        Ok(SimulationConfig::parse("")?)
    }
}
