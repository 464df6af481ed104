//! Allocation engine for the Hydroequity simulation.
//!
//! Given the supply available this hour and a demand vector, this crate
//! produces two allocations and scores them:
//!
//! - [`baseline`] -- proportional rationing. Every sector gets the same
//!   fraction of its demand; nobody gets more than they asked for.
//! - [`equity`] -- [`EquityAllocator`], a weighted softmax over
//!   loss-discounted demand whose per-sector weights are tuned by a
//!   fixed-step heuristic toward equal satisfaction ratios.
//! - [`metrics`] -- satisfaction ratios, coefficient of variation, Gini
//!   coefficient, and equity index of any allocation.
//! - [`error`] -- Input validation errors.
//!
//! All vectors are positional: index `i` is the sector with id `i + 1`.

pub mod baseline;
pub mod equity;
pub mod error;
pub mod metrics;

pub use equity::{EquityAllocator, TrainingReport, softmax};
pub use error::AllocationError;

/// Convert a vector length into an `f64` divisor.
///
/// Saturates at `u32::MAX`, far beyond any realistic sector count.
pub(crate) fn count_as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}

/// Reject supply totals and demand vectors the engine cannot allocate.
///
/// Totals must be finite and non-negative; demands must be finite and
/// non-negative.
pub(crate) fn validate_inputs(total_available: f64, demands: &[f64]) -> Result<(), AllocationError> {
    if !total_available.is_finite() || total_available < 0.0 {
        return Err(AllocationError::InvalidTotal(total_available));
    }
    for (index, &value) in demands.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(AllocationError::InvalidDemand { index, value });
        }
    }
    Ok(())
}
