//! Trainable weighted-softmax allocator.
//!
//! Each sector's demand is discounted by its historical loss factor and
//! scaled by a per-sector weight. The softmax of those adjusted demands is
//! the fraction of the total supply each sector receives, so the full
//! supply is always distributed.
//!
//! Training is a fixed-step heuristic, not gradient descent: each epoch
//! nudges every weight against the deviation of that sector's satisfaction
//! ratio from the mean,
//!
//! ```text
//! w[i] -= learning_rate * (ratio[i] - mean(ratio)) * damping
//! ```
//!
//! which over enough epochs pulls the satisfaction ratios together.

use hydroequity_network::StaticRegistry;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AllocationError;
use crate::{count_as_f64, validate_inputs};

/// Step size of the weight update.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Multiplier applied on top of the learning rate.
pub const DEFAULT_DAMPING: f64 = 0.1;

/// Lower bound (inclusive) of a freshly initialized weight.
const INITIAL_WEIGHT_MIN: f64 = 0.5;

/// Upper bound (exclusive) of a freshly initialized weight.
const INITIAL_WEIGHT_MAX: f64 = 1.0;

/// Numerically stable softmax.
///
/// Subtracts the maximum before exponentiating so large inputs such as
/// `[1000, 1001, 1002]` do not overflow. Every entry of the result is
/// positive and the entries sum to 1. An empty slice yields an empty vector.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    // The maximum contributes exp(0) = 1, so the sum is at least 1.
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Satisfaction fraction per sector; zero-demand sectors count as satisfied.
fn satisfaction_fractions(allocation: &[f64], demands: &[f64]) -> Vec<f64> {
    allocation
        .iter()
        .zip(demands)
        .map(|(a, d)| if *d > 0.0 { a / d } else { 1.0 })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / count_as_f64(values.len())
}

/// Population standard deviation.
fn spread(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mu = mean(values);
    let variance =
        values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / count_as_f64(values.len());
    variance.sqrt()
}

/// Summary of one training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Number of epochs executed.
    pub epochs: u32,
    /// Standard deviation of the satisfaction fractions before training.
    pub initial_spread: f64,
    /// Standard deviation of the satisfaction fractions after training.
    pub final_spread: f64,
}

impl TrainingReport {
    /// Whether training tightened (or preserved) the satisfaction spread.
    pub fn improved(&self) -> bool {
        self.final_spread <= self.initial_spread
    }
}

/// Weighted-softmax allocator with one learnable weight per sector.
#[derive(Debug, Clone)]
pub struct EquityAllocator {
    weights: Vec<f64>,
    loss_factors: Vec<f64>,
    learning_rate: f64,
    damping: f64,
    trained: bool,
}

impl EquityAllocator {
    /// Create an untrained allocator for the registry's sectors, drawing
    /// initial weights uniformly from `[0.5, 1.0)`.
    pub fn new<R: Rng + ?Sized>(registry: &StaticRegistry, rng: &mut R) -> Self {
        let loss_factors = registry.loss_factors();
        let weights = random_weights(loss_factors.len(), rng);
        Self {
            weights,
            loss_factors,
            learning_rate: DEFAULT_LEARNING_RATE,
            damping: DEFAULT_DAMPING,
            trained: false,
        }
    }

    /// Restore an allocator from known weights.
    ///
    /// The allocator is reported as untrained; weights must be finite and
    /// match the registry's sector count.
    pub fn with_weights(
        registry: &StaticRegistry,
        weights: Vec<f64>,
    ) -> Result<Self, AllocationError> {
        let loss_factors = registry.loss_factors();
        if weights.len() != loss_factors.len() {
            return Err(AllocationError::LengthMismatch {
                expected: loss_factors.len(),
                found: weights.len(),
            });
        }
        if let Some((index, &value)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(AllocationError::InvalidWeight { index, value });
        }
        Ok(Self {
            weights,
            loss_factors,
            learning_rate: DEFAULT_LEARNING_RATE,
            damping: DEFAULT_DAMPING,
            trained: false,
        })
    }

    /// Override the learning rate and damping of the weight update.
    #[must_use]
    pub const fn with_step(mut self, learning_rate: f64, damping: f64) -> Self {
        self.learning_rate = learning_rate;
        self.damping = damping;
        self
    }

    /// Current per-sector weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Per-sector `1 - loss / 100` factors captured from the registry.
    pub fn loss_factors(&self) -> &[f64] {
        &self.loss_factors
    }

    /// Number of sectors this allocator serves.
    pub fn sector_count(&self) -> usize {
        self.weights.len()
    }

    /// Whether [`train`](Self::train) has completed since construction or
    /// the last [`reset_weights`](Self::reset_weights).
    pub const fn is_trained(&self) -> bool {
        self.trained
    }

    /// Distribute `total_available` across sectors.
    ///
    /// The result always sums to `total_available` (up to rounding), so
    /// sectors may receive more than they demanded.
    pub fn predict(&self, total_available: f64, demands: &[f64]) -> Result<Vec<f64>, AllocationError> {
        self.check_len(demands)?;
        validate_inputs(total_available, demands)?;
        Ok(self.distribute(total_available, demands))
    }

    /// Run `epochs` weight updates against one representative snapshot.
    ///
    /// Deterministic for given initial weights and inputs. Marks the
    /// allocator as trained, even for zero epochs.
    pub fn train(
        &mut self,
        total_available: f64,
        demands: &[f64],
        epochs: u32,
    ) -> Result<TrainingReport, AllocationError> {
        self.check_len(demands)?;
        validate_inputs(total_available, demands)?;

        let initial = satisfaction_fractions(&self.distribute(total_available, demands), demands);
        let initial_spread = spread(&initial);

        for epoch in 0..epochs {
            let allocation = self.distribute(total_available, demands);
            let ratios = satisfaction_fractions(&allocation, demands);
            let mu = mean(&ratios);
            let step = self.learning_rate * self.damping;
            for (weight, ratio) in self.weights.iter_mut().zip(&ratios) {
                *weight -= step * (ratio - mu);
            }
            if epoch.checked_rem(100) == Some(0) {
                debug!(epoch, spread = spread(&ratios), "Training epoch");
            }
        }

        let final_ratios =
            satisfaction_fractions(&self.distribute(total_available, demands), demands);
        let report = TrainingReport {
            epochs,
            initial_spread,
            final_spread: spread(&final_ratios),
        };
        self.trained = true;

        info!(
            epochs,
            initial_spread = report.initial_spread,
            final_spread = report.final_spread,
            "Equity allocator trained"
        );
        Ok(report)
    }

    /// Draw fresh weights and mark the allocator untrained.
    pub fn reset_weights<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.weights = random_weights(self.weights.len(), rng);
        self.trained = false;
    }

    fn check_len(&self, demands: &[f64]) -> Result<(), AllocationError> {
        if demands.len() == self.weights.len() {
            Ok(())
        } else {
            Err(AllocationError::LengthMismatch {
                expected: self.weights.len(),
                found: demands.len(),
            })
        }
    }

    fn distribute(&self, total_available: f64, demands: &[f64]) -> Vec<f64> {
        let adjusted: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.loss_factors)
            .zip(demands)
            .map(|((w, loss), d)| w * d * loss)
            .collect();
        softmax(&adjusted)
            .into_iter()
            .map(|share| share * total_available)
            .collect()
    }
}

fn random_weights<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f64> {
    (0..count)
        .map(|_| rng.random_range(INITIAL_WEIGHT_MIN..INITIAL_WEIGHT_MAX))
        .collect()
}
