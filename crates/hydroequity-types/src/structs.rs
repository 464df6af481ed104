//! Core entity structs for the Hydroequity simulation.
//!
//! Catalog entries (sources, treatment plants, sectors), the per-tick
//! availability breakdown, equity metric results, and the snapshot and
//! history records handed to the observer surface.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{SatisfactionBand, Scenario, SourceKind};
use crate::ids::SectorId;

// ---------------------------------------------------------------------------
// Catalog entries
// ---------------------------------------------------------------------------

/// A raw-water source feeding the treatment plants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Source {
    /// What kind of intake this is. Scenario factors are keyed on the kind.
    pub kind: SourceKind,
    /// Display name.
    pub name: String,
    /// Nominal output in litres per second.
    pub capacity: f64,
}

/// A treatment plant. Informational only: plants do not constrain allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TreatmentPlant {
    /// Short stable key (e.g. `chacon`).
    pub key: String,
    /// Display name.
    pub name: String,
    /// Treatment capacity in litres per second.
    pub capacity: f64,
    /// Storage volume in cubic metres.
    pub storage: f64,
}

/// A municipal distribution sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Sector {
    /// Catalog number, `1..=N` in order.
    pub id: SectorId,
    /// Display name.
    pub name: String,
    /// Resident population served.
    pub population: u32,
    /// Historical non-revenue water (IANC) as a percentage in `[0, 100]`.
    pub historical_loss_percent: f64,
    /// Average demand in litres per second.
    pub base_demand: f64,
}

impl Sector {
    /// Fraction of supplied water that historically reaches consumers.
    pub fn loss_factor(&self) -> f64 {
        1.0 - self.historical_loss_percent / 100.0
    }
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Output of a single source under the active scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SourceAvailability {
    /// Source kind.
    pub kind: SourceKind,
    /// Source display name.
    pub name: String,
    /// Nominal capacity.
    pub capacity: f64,
    /// Scenario factor applied to the capacity.
    pub factor: f64,
    /// `capacity * factor`.
    pub available: f64,
}

/// Supply available for allocation this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Availability {
    /// Scenario the factors were taken from.
    pub scenario: Scenario,
    /// Per-source breakdown in catalog order.
    pub sources: Vec<SourceAvailability>,
    /// Sum of all per-source availability.
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Fairness statistics over the satisfaction ratios of an allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EquityMetricsResult {
    /// Allocation over demand per sector, in percent. Not clamped above 100.
    pub satisfaction_ratios: Vec<f64>,
    /// Mean satisfaction percentage.
    pub mean: f64,
    /// Population standard deviation of the satisfaction percentages.
    pub std_dev: f64,
    /// `std_dev / mean * 100`; 0 when the mean is 0.
    pub coefficient_of_variation: f64,
    /// Rank-weighted Gini coefficient; 0 is perfect equity.
    pub gini: f64,
    /// `max(0, 100 - coefficient_of_variation)`; 100 is perfect equity.
    pub equity_index: f64,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Merged per-sector row of a tick snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SectorView {
    /// Sector id.
    pub id: SectorId,
    /// Sector name.
    pub name: String,
    /// Population served.
    pub population: u32,
    /// Demand generated for this tick.
    pub demand: f64,
    /// Supply under proportional rationing.
    pub baseline_supply: f64,
    /// Supply under the equity allocator.
    pub optimized_supply: f64,
    /// Baseline satisfaction percentage.
    pub baseline_satisfaction: f64,
    /// Optimized satisfaction percentage.
    pub optimized_satisfaction: f64,
    /// Historical loss percentage (IANC).
    pub historical_loss_percent: f64,
    /// Band of the baseline satisfaction.
    pub baseline_band: SatisfactionBand,
    /// Band of the optimized satisfaction.
    pub optimized_band: SatisfactionBand,
}

/// Everything computed during one recomputation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickSnapshot {
    /// Tick counter at which the snapshot was taken.
    pub tick: u64,
    /// Hour of day, `0..=23`.
    pub hour: u8,
    /// Active scenario.
    pub scenario: Scenario,
    /// Whether the equity allocator has been trained.
    pub trained: bool,
    /// Total supply available.
    pub total_available: f64,
    /// Per-source availability.
    pub sources: Vec<SourceAvailability>,
    /// Demand per sector.
    pub demands: Vec<f64>,
    /// Proportional-rationing allocation.
    pub baseline_allocation: Vec<f64>,
    /// Equity allocation (equal to the baseline until trained).
    pub optimized_allocation: Vec<f64>,
    /// Metrics of the baseline allocation.
    pub baseline_metrics: EquityMetricsResult,
    /// Metrics of the optimized allocation.
    pub optimized_metrics: EquityMetricsResult,
    /// Optimized equity index minus baseline equity index.
    pub equity_improvement: f64,
    /// Merged per-sector view.
    pub sectors: Vec<SectorView>,
}

/// One entry in the rolling equity history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HistoryRecord {
    /// Hour of day the record was taken at.
    pub hour: u8,
    /// Baseline equity index.
    pub baseline_equity_index: f64,
    /// Optimized equity index.
    pub optimized_equity_index: f64,
    /// Baseline Gini coefficient.
    pub baseline_gini: f64,
    /// Optimized Gini coefficient.
    pub optimized_gini: f64,
}

impl HistoryRecord {
    /// Build a history record from a snapshot.
    pub fn from_snapshot(snapshot: &TickSnapshot) -> Self {
        Self {
            hour: snapshot.hour,
            baseline_equity_index: snapshot.baseline_metrics.equity_index,
            optimized_equity_index: snapshot.optimized_metrics.equity_index,
            baseline_gini: snapshot.baseline_metrics.gini,
            optimized_gini: snapshot.optimized_metrics.gini,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_factor_discounts_losses() {
        let sector = Sector {
            id: SectorId::new(1),
            name: "Sector 1 (Sur)".to_owned(),
            population: 10_000,
            historical_loss_percent: 71.0,
            base_demand: 60.0,
        };
        assert!((sector.loss_factor() - 0.29).abs() < 1e-12);
    }

    #[test]
    fn sector_deserializes_from_json() {
        let json = r#"{"id":2,"name":"Sector 2","population":6000,"historical_loss_percent":4.0,"base_demand":35.0}"#;
        let sector: Result<Sector, _> = serde_json::from_str(json);
        assert!(sector.is_ok());
        let sector = sector.ok();
        assert_eq!(sector.map(|s| s.id), Some(SectorId::new(2)));
    }

    #[test]
    fn default_metrics_are_zeroed() {
        let metrics = EquityMetricsResult::default();
        assert!(metrics.satisfaction_ratios.is_empty());
        assert!(metrics.equity_index.abs() < f64::EPSILON);
    }
}
