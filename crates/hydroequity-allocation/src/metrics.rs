//! Fairness statistics over an allocation.
//!
//! Every statistic is computed from the satisfaction ratios: allocation over
//! demand, in percent. Ratios are not clamped, so an over-supplied sector
//! can exceed 100.

use hydroequity_types::EquityMetricsResult;

use crate::count_as_f64;
use crate::error::AllocationError;

/// Satisfaction percentage per sector. Zero-demand sectors count as 100.
pub fn satisfaction_ratios(allocation: &[f64], demands: &[f64]) -> Vec<f64> {
    allocation
        .iter()
        .zip(demands)
        .map(|(a, d)| if *d > 0.0 { a / d * 100.0 } else { 100.0 })
        .collect()
}

/// Rank-weighted Gini coefficient of `values`.
///
/// `|sum((2(i+1) - N - 1) * sorted[i]) / (N * sum(values))|` over the values
/// sorted ascending. Zero for perfectly equal values and for an all-zero or
/// empty input.
pub fn gini(values: &[f64]) -> f64 {
    let total: f64 = values.iter().sum();
    if values.is_empty() || total == 0.0 {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = count_as_f64(sorted.len());
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let rank = count_as_f64(i.saturating_add(1));
            (2.0f64.mul_add(rank, -n) - 1.0) * v
        })
        .sum();

    (weighted / (n * total)).abs()
}

/// Score an allocation against the demand it was meant to serve.
///
/// - `coefficient_of_variation = std_dev / mean * 100`, or 0 when the mean is 0
/// - `equity_index = max(0, 100 - coefficient_of_variation)`
///
/// Empty inputs produce a zeroed result with an equity index of 100.
pub fn compute(allocation: &[f64], demands: &[f64]) -> Result<EquityMetricsResult, AllocationError> {
    if allocation.len() != demands.len() {
        return Err(AllocationError::LengthMismatch {
            expected: demands.len(),
            found: allocation.len(),
        });
    }

    let ratios = satisfaction_ratios(allocation, demands);
    let (mean, std_dev) = if ratios.is_empty() {
        (0.0, 0.0)
    } else {
        let n = count_as_f64(ratios.len());
        let mean = ratios.iter().sum::<f64>() / n;
        let variance = ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        (mean, variance.sqrt())
    };

    let coefficient_of_variation = if mean == 0.0 {
        0.0
    } else {
        std_dev / mean * 100.0
    };
    let equity_index = (100.0 - coefficient_of_variation).max(0.0);
    let gini = gini(&ratios);

    Ok(EquityMetricsResult {
        satisfaction_ratios: ratios,
        mean,
        std_dev,
        coefficient_of_variation,
        gini,
        equity_index,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::baseline;

    #[test]
    fn proportional_allocation_is_perfectly_equitable() {
        let demands = [60.0, 35.0, 88.0, 75.0, 15.0, 9.0, 10.0, 72.0, 20.0, 11.0];
        let allocation = baseline::allocate(150.0, &demands).unwrap();
        let result = compute(&allocation, &demands).unwrap();

        assert!((result.mean - 15000.0 / 395.0).abs() < 1e-9);
        assert!(result.coefficient_of_variation.abs() < 1e-9);
        assert!((result.equity_index - 100.0).abs() < 1e-9);
        assert!(result.gini.abs() < 1e-12);
    }

    #[test]
    fn zero_demand_counts_as_satisfied() {
        let ratios = satisfaction_ratios(&[5.0, 0.0], &[10.0, 0.0]);
        assert_eq!(ratios, vec![50.0, 100.0]);
    }

    #[test]
    fn ratios_are_not_clamped() {
        let result = compute(&[20.0], &[10.0]).unwrap();
        assert!((result.satisfaction_ratios.first().copied().unwrap() - 200.0).abs() < 1e-12);
    }

    #[test]
    fn zero_mean_has_zero_cv() {
        let result = compute(&[0.0, 0.0, 0.0], &[5.0, 6.0, 7.0]).unwrap();
        assert!(result.mean.abs() < f64::EPSILON);
        assert!(result.coefficient_of_variation.abs() < f64::EPSILON);
        assert!(result.gini.abs() < f64::EPSILON);
        assert!((result.equity_index - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_input_is_perfect_equity() {
        let result = compute(&[], &[]).unwrap();
        assert!(result.satisfaction_ratios.is_empty());
        assert!(result.gini.abs() < f64::EPSILON);
        assert!((result.equity_index - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert_eq!(
            compute(&[1.0, 2.0], &[1.0]),
            Err(AllocationError::LengthMismatch { expected: 1, found: 2 })
        );
    }

    #[test]
    fn gini_zero_when_equal() {
        assert!(gini(&[40.0, 40.0, 40.0, 40.0]).abs() < 1e-12);
    }

    #[test]
    fn gini_of_maximal_inequality() {
        // One holder of everything among four: (N - 1) / N.
        assert!((gini(&[0.0, 0.0, 0.0, 100.0]) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn gini_ignores_input_order() {
        let a = gini(&[10.0, 90.0, 50.0, 30.0]);
        let b = gini(&[90.0, 30.0, 10.0, 50.0]);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn gini_grows_as_one_ratio_diverges() {
        let mut previous = 0.0;
        for step in 1..=20 {
            let outlier = 100.0 + f64::from(step) * 25.0;
            let value = gini(&[100.0, 100.0, 100.0, outlier]);
            assert!(value > previous, "gini {value} did not grow past {previous}");
            previous = value;
        }
    }

    #[test]
    fn high_variation_floors_equity_index() {
        let result = compute(&[100.0, 0.0, 0.0, 0.0], &[10.0, 10.0, 10.0, 10.0]).unwrap();
        assert!(result.coefficient_of_variation > 100.0);
        assert!(result.equity_index.abs() < f64::EPSILON);
    }
}
