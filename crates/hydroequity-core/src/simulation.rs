//! The recomputation pass that produces one [`TickSnapshot`].
//!
//! Each pass runs these steps in order:
//!
//! 1. **Demand** -- synthesize per-sector demand for the current hour.
//! 2. **Availability** -- apply the active scenario's factors to the
//!    source capacities.
//! 3. **Allocation** -- proportional baseline, plus the equity allocator
//!    once it has been trained (until then the optimized allocation is the
//!    baseline).
//! 4. **Scoring** -- equity metrics of both allocations and their
//!    difference.
//! 5. **Record** -- on [`Simulation::step`] only: append a history record
//!    and advance the clock.
//!
//! [`Simulation`] is the single owner of every piece of mutable state:
//! clock, scenario, demand RNG, allocator weights, history. Nothing else
//! holds a reference into it, so training can never overlap a pass.

use hydroequity_allocation::equity::TrainingReport;
use hydroequity_allocation::{AllocationError, EquityAllocator, baseline, metrics};
use hydroequity_network::{AvailabilityModel, DemandGenerator, RegistryError, StaticRegistry};
use hydroequity_types::{
    EquityMetricsResult, HistoryRecord, SatisfactionBand, Scenario, SectorView, TickSnapshot,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::clock::{ClockError, SimulationClock};
use crate::config::{SimulationConfig, TrainingConfig};
use crate::history::RollingHistory;

/// Offset separating the weight RNG stream from the demand RNG stream.
const WEIGHT_STREAM_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Errors that can occur while building or stepping the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The configured network catalog is invalid.
    #[error("registry error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: RegistryError,
    },

    /// An allocation input was rejected.
    #[error("allocation error: {source}")]
    Allocation {
        /// The underlying allocation error.
        #[from]
        source: AllocationError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// What a call to [`Simulation::train`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainOutcome {
    /// Training ran.
    Trained(TrainingReport),
    /// The allocator was already trained and retraining is disabled.
    AlreadyTrained,
}

/// Owner of all mutable simulation state.
#[derive(Debug)]
pub struct Simulation {
    registry: StaticRegistry,
    demand: DemandGenerator,
    weight_rng: SmallRng,
    allocator: EquityAllocator,
    clock: SimulationClock,
    scenario: Scenario,
    history: RollingHistory,
    training: TrainingConfig,
}

impl Simulation {
    /// Build a simulation from configuration, using the configured network
    /// catalog when present and the built-in Sogamoso catalog otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Registry`] if the configured catalog is
    /// invalid.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let registry = match &config.network {
            Some(catalog) => StaticRegistry::new(catalog.clone())?,
            None => StaticRegistry::sogamoso(),
        };
        Ok(Self::new(registry, config))
    }

    /// Build a simulation over an already validated registry.
    pub fn new(registry: StaticRegistry, config: &SimulationConfig) -> Self {
        let seed = config.world.seed;
        let mut weight_rng = SmallRng::seed_from_u64(seed.wrapping_add(WEIGHT_STREAM_OFFSET));
        let allocator = EquityAllocator::new(&registry, &mut weight_rng)
            .with_step(config.training.learning_rate, config.training.damping);

        Self {
            demand: DemandGenerator::seeded(seed),
            weight_rng,
            allocator,
            clock: SimulationClock::new(),
            scenario: config.scenario.resolve(),
            history: RollingHistory::new(config.history.capacity),
            training: config.training.clone(),
            registry,
        }
    }

    /// Compute the snapshot for the current hour, record it, and advance
    /// the clock.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if allocation fails or the clock
    /// overflows.
    pub fn step(&mut self) -> Result<TickSnapshot, SimulationError> {
        let snapshot = self.compute()?;
        self.history.push(HistoryRecord::from_snapshot(&snapshot));
        self.clock.advance()?;

        debug!(
            tick = snapshot.tick,
            hour = snapshot.hour,
            scenario = %snapshot.scenario,
            total_available = snapshot.total_available,
            baseline_equity = snapshot.baseline_metrics.equity_index,
            optimized_equity = snapshot.optimized_metrics.equity_index,
            "Tick computed"
        );
        Ok(snapshot)
    }

    /// Compute a snapshot for the current hour without touching the clock
    /// or the history.
    ///
    /// Demand noise is still drawn, so consecutive previews differ.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Allocation`] if allocation fails.
    pub fn preview(&mut self) -> Result<TickSnapshot, SimulationError> {
        self.compute()
    }

    /// Switch the active scenario. Takes effect on the next pass.
    pub fn set_scenario(&mut self, scenario: Scenario) {
        if scenario != self.scenario {
            info!(from = %self.scenario, to = %scenario, "Scenario changed");
        }
        self.scenario = scenario;
    }

    /// Return to hour 0 and clear the history. Scenario and weights are kept.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.history.clear();
        info!("Simulation reset");
    }

    /// Train the equity allocator on the representative snapshot: base
    /// demands with the configured representative supply.
    ///
    /// Once trained this is a no-op unless `training.allow_retrain` is set.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Allocation`] if training inputs are
    /// rejected.
    pub fn train(&mut self) -> Result<TrainOutcome, SimulationError> {
        if self.allocator.is_trained() && !self.training.allow_retrain {
            info!("Equity allocator already trained, ignoring train request");
            return Ok(TrainOutcome::AlreadyTrained);
        }
        self.run_training()
    }

    /// Draw fresh weights and train from scratch, regardless of the retrain
    /// setting.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Allocation`] if training inputs are
    /// rejected.
    pub fn retrain(&mut self) -> Result<TrainOutcome, SimulationError> {
        self.allocator.reset_weights(&mut self.weight_rng);
        self.run_training()
    }

    fn run_training(&mut self) -> Result<TrainOutcome, SimulationError> {
        let demands = self.registry.base_demands();
        let report = self.allocator.train(
            self.training.representative_total_available,
            &demands,
            self.training.epochs,
        )?;
        Ok(TrainOutcome::Trained(report))
    }

    fn compute(&mut self) -> Result<TickSnapshot, SimulationError> {
        let hour = self.clock.hour();
        let demands = self.demand.generate_all(hour, &self.registry);
        let availability = AvailabilityModel::new(&self.registry).availability(self.scenario);
        let total = availability.total;

        let baseline_allocation = baseline::allocate(total, &demands)?;
        let trained = self.allocator.is_trained();
        let optimized_allocation = if trained {
            self.allocator.predict(total, &demands)?
        } else {
            baseline_allocation.clone()
        };

        let baseline_metrics = metrics::compute(&baseline_allocation, &demands)?;
        let optimized_metrics = metrics::compute(&optimized_allocation, &demands)?;
        let sectors = self.sector_views(
            &demands,
            &baseline_allocation,
            &optimized_allocation,
            &baseline_metrics,
            &optimized_metrics,
        );

        Ok(TickSnapshot {
            tick: self.clock.tick(),
            hour,
            scenario: self.scenario,
            trained,
            total_available: total,
            sources: availability.sources,
            equity_improvement: optimized_metrics.equity_index - baseline_metrics.equity_index,
            demands,
            baseline_allocation,
            optimized_allocation,
            baseline_metrics,
            optimized_metrics,
            sectors,
        })
    }

    fn sector_views(
        &self,
        demands: &[f64],
        baseline: &[f64],
        optimized: &[f64],
        baseline_metrics: &EquityMetricsResult,
        optimized_metrics: &EquityMetricsResult,
    ) -> Vec<SectorView> {
        self.registry
            .sectors()
            .iter()
            .enumerate()
            .map(|(i, sector)| {
                let at = |values: &[f64]| values.get(i).copied().unwrap_or(0.0);
                let baseline_satisfaction = at(&baseline_metrics.satisfaction_ratios);
                let optimized_satisfaction = at(&optimized_metrics.satisfaction_ratios);
                SectorView {
                    id: sector.id,
                    name: sector.name.clone(),
                    population: sector.population,
                    demand: at(demands),
                    baseline_supply: at(baseline),
                    optimized_supply: at(optimized),
                    baseline_satisfaction,
                    optimized_satisfaction,
                    historical_loss_percent: sector.historical_loss_percent,
                    baseline_band: SatisfactionBand::classify(baseline_satisfaction),
                    optimized_band: SatisfactionBand::classify(optimized_satisfaction),
                }
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The immutable network catalog.
    pub const fn registry(&self) -> &StaticRegistry {
        &self.registry
    }

    /// The simulation clock.
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// The active scenario.
    pub const fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// The rolling equity history.
    pub const fn history(&self) -> &RollingHistory {
        &self.history
    }

    /// The equity allocator.
    pub const fn allocator(&self) -> &EquityAllocator {
        &self.allocator
    }

    /// Whether the equity allocator has been trained.
    pub const fn is_trained(&self) -> bool {
        self.allocator.is_trained()
    }
}
