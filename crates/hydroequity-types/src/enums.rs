//! Enumeration types for the Hydroequity simulation.
//!
//! Covers the operating scenarios the network can be placed in, the kinds of
//! raw-water source feeding the treatment plants, and the satisfaction bands
//! used to flag under-served sectors.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// Operating scenario that scales raw-water source output.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// All sources at nominal output.
    #[default]
    Normal,
    /// Dry season: lake and river output reduced.
    Drought,
    /// Peak demand period. Sources remain at nominal output.
    Peak,
    /// Partial lake outage with the river intake offline.
    Failure,
}

impl Scenario {
    /// Every scenario in display order.
    pub const ALL: [Self; 4] = [Self::Normal, Self::Drought, Self::Peak, Self::Failure];

    /// Parse a scenario name (case-insensitive). Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "drought" => Some(Self::Drought),
            "peak" => Some(Self::Peak),
            "failure" => Some(Self::Failure),
            _ => None,
        }
    }

    /// Lowercase wire name of the scenario.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Drought => "drought",
            Self::Peak => "peak",
            Self::Failure => "failure",
        }
    }
}

impl core::fmt::Display for Scenario {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// The kind of raw-water source. Scenario factors are keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Surface lake intake (Lago Tota).
    Lake,
    /// River intake (Río Tejar).
    River,
    /// Deep groundwater well. Output does not depend on the scenario.
    DeepWell,
}

// ---------------------------------------------------------------------------
// Satisfaction bands
// ---------------------------------------------------------------------------

/// Coarse classification of a sector's satisfaction percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionBand {
    /// At least 95% of demand met.
    Adequate,
    /// At least 80% of demand met.
    Strained,
    /// At least 60% of demand met.
    Deficient,
    /// Less than 60% of demand met.
    Critical,
}

impl SatisfactionBand {
    /// Classify a satisfaction percentage. `NaN` is treated as critical.
    pub fn classify(percent: f64) -> Self {
        if percent >= 95.0 {
            Self::Adequate
        } else if percent >= 80.0 {
            Self::Strained
        } else if percent >= 60.0 {
            Self::Deficient
        } else {
            Self::Critical
        }
    }
}
