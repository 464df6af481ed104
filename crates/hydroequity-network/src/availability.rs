//! Scenario-dependent source availability.
//!
//! Each scenario scales the lake and river intakes; the deep well always
//! runs at nominal output:
//!
//! | Scenario | Lake | River | Deep well |
//! |----------|------|-------|-----------|
//! | normal   | 1.0  | 1.0   | 1.0       |
//! | drought  | 0.7  | 0.5   | 1.0       |
//! | peak     | 1.0  | 1.0   | 1.0       |
//! | failure  | 0.5  | 0.0   | 1.0       |
//!
//! Unknown scenario names never fail: they resolve to `normal`.

use hydroequity_types::{Availability, Scenario, SourceAvailability, SourceKind};

use crate::registry::StaticRegistry;

/// Output factor of a source kind under a scenario.
pub const fn scenario_factor(scenario: Scenario, kind: SourceKind) -> f64 {
    match (scenario, kind) {
        (_, SourceKind::DeepWell)
        | (Scenario::Normal | Scenario::Peak, _) => 1.0,
        (Scenario::Drought, SourceKind::Lake) => 0.7,
        (Scenario::Drought, SourceKind::River) => 0.5,
        (Scenario::Failure, SourceKind::Lake) => 0.5,
        (Scenario::Failure, SourceKind::River) => 0.0,
    }
}

/// Maps a scenario onto the registry's sources.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityModel<'a> {
    registry: &'a StaticRegistry,
}

impl<'a> AvailabilityModel<'a> {
    /// Create a model over the given registry.
    pub const fn new(registry: &'a StaticRegistry) -> Self {
        Self { registry }
    }

    /// Per-source and total availability under `scenario`.
    pub fn availability(&self, scenario: Scenario) -> Availability {
        let sources: Vec<SourceAvailability> = self
            .registry
            .sources()
            .iter()
            .map(|src| {
                let factor = scenario_factor(scenario, src.kind);
                SourceAvailability {
                    kind: src.kind,
                    name: src.name.clone(),
                    capacity: src.capacity,
                    factor,
                    available: src.capacity * factor,
                }
            })
            .collect();
        let total = sources.iter().map(|s| s.available).sum();

        Availability {
            scenario,
            sources,
            total,
        }
    }
}
