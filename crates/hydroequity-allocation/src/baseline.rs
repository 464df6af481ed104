//! Proportional rationing.
//!
//! The reference policy the equity allocator is compared against. When
//! supply covers demand every sector gets exactly what it asked for;
//! otherwise every sector gets the same fraction of its demand.

use crate::error::AllocationError;
use crate::validate_inputs;

/// Allocate `total_available` proportionally to `demands`.
///
/// - Total demand of zero, or supply at or above total demand, yields a copy
///   of the demand vector.
/// - Otherwise each entry is `demand * total_available / total_demand`.
///
/// No sector ever receives more than its demand and the sum never exceeds
/// `total_available`.
pub fn allocate(total_available: f64, demands: &[f64]) -> Result<Vec<f64>, AllocationError> {
    validate_inputs(total_available, demands)?;

    let total_demand: f64 = demands.iter().sum();
    if total_demand <= 0.0 || total_available >= total_demand {
        return Ok(demands.to_vec());
    }

    let share = total_available / total_demand;
    Ok(demands.iter().map(|d| d * share).collect())
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn scarcity_scales_every_sector_equally() {
        let allocation = allocate(150.0, &[60.0, 35.0, 88.0, 75.0, 15.0, 9.0, 10.0, 72.0, 20.0, 11.0]);
        assert!(allocation.is_ok());
        let allocation = allocation.unwrap_or_default();

        // 150 / 395 of each demand.
        let first = allocation.first().copied().unwrap_or_default();
        assert!((first - 60.0 * 150.0 / 395.0).abs() < 1e-9);
        assert!((first - 22.7848).abs() < 1e-4);

        let sum: f64 = allocation.iter().sum();
        assert!((sum - 150.0).abs() < 1e-9);
    }

    #[test]
    fn surplus_returns_demand_unchanged() {
        let demands = [10.0, 20.0, 30.0];
        let allocation = allocate(100.0, &demands);
        assert_eq!(allocation, Ok(demands.to_vec()));
    }

    #[test]
    fn exact_supply_returns_demand_unchanged() {
        let demands = [10.0, 20.0, 30.0];
        assert_eq!(allocate(60.0, &demands), Ok(demands.to_vec()));
    }

    #[test]
    fn zero_demand_yields_zeros() {
        assert_eq!(allocate(100.0, &[0.0, 0.0, 0.0]), Ok(vec![0.0, 0.0, 0.0]));
    }

    #[test]
    fn zero_supply_yields_zeros() {
        assert_eq!(allocate(0.0, &[5.0, 7.0]), Ok(vec![0.0, 0.0]));
    }

    #[test]
    fn empty_demand_yields_empty_allocation() {
        assert_eq!(allocate(50.0, &[]), Ok(Vec::new()));
    }

    #[test]
    fn rejects_negative_demand() {
        assert_eq!(
            allocate(10.0, &[1.0, -2.0]),
            Err(AllocationError::InvalidDemand { index: 1, value: -2.0 })
        );
    }

    #[test]
    fn rejects_invalid_total() {
        assert!(matches!(allocate(-1.0, &[1.0]), Err(AllocationError::InvalidTotal(_))));
        assert!(matches!(allocate(f64::NAN, &[1.0]), Err(AllocationError::InvalidTotal(_))));
    }

    #[test]
    fn never_exceeds_demand_or_supply() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..200 {
            let demands: Vec<f64> = (0..10).map(|_| rng.random_range(0.0..100.0)).collect();
            let total = rng.random_range(0.0..600.0);
            let allocation = allocate(total, &demands).unwrap_or_default();

            assert_eq!(allocation.len(), demands.len());
            for (a, d) in allocation.iter().zip(&demands) {
                assert!(*a >= 0.0);
                assert!(*a <= d + 1e-9, "allocation {a} exceeds demand {d}");
            }
            let sum: f64 = allocation.iter().sum();
            assert!(sum <= total + 1e-9);
        }
    }
}
