//! Hour-of-day demand synthesis.
//!
//! Each sector's demand for an hour is its base demand scaled by a daily
//! consumption profile and a bounded random factor:
//!
//! | Hours    | Factor | Period          |
//! |----------|--------|-----------------|
//! | 0 - 5    | 0.6    | night           |
//! | 6 - 8    | 1.4    | morning peak    |
//! | 18 - 20  | 1.3    | evening peak    |
//! | 22 - 24  | 0.7    | late evening    |
//! | other    | 1.0    | daytime         |
//!
//! The random factor is drawn uniformly from `[0.9, 1.1)`, one draw per
//! sector per call. The RNG is owned by the generator and can be seeded for
//! reproducible runs.

use hydroequity_types::Sector;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::registry::StaticRegistry;

/// Lower bound (inclusive) of the random demand factor.
pub const NOISE_MIN: f64 = 0.9;

/// Upper bound (exclusive) of the random demand factor.
pub const NOISE_MAX: f64 = 1.1;

/// Consumption multiplier for an hour of the day.
pub const fn hour_factor(hour: u8) -> f64 {
    match hour {
        6..=8 => 1.4,
        18..=20 => 1.3,
        0..=5 => 0.6,
        22..=24 => 0.7,
        _ => 1.0,
    }
}

/// Synthesizes per-sector demand from base demand, hour, and noise.
#[derive(Debug, Clone)]
pub struct DemandGenerator<R = SmallRng> {
    rng: R,
}

impl DemandGenerator<SmallRng> {
    /// Create a generator with a deterministic RNG seeded from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> DemandGenerator<R> {
    /// Create a generator drawing noise from the given RNG.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Demand of one sector at the given hour. Consumes one random draw.
    pub fn generate(&mut self, hour: u8, sector: &Sector) -> f64 {
        let noise = self.rng.random_range(NOISE_MIN..NOISE_MAX);
        sector.base_demand * hour_factor(hour) * noise
    }

    /// Demand of every sector in the registry, in sector order.
    pub fn generate_all(&mut self, hour: u8, registry: &StaticRegistry) -> Vec<f64> {
        registry
            .sectors()
            .iter()
            .map(|sector| self.generate(hour, sector))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use hydroequity_types::SectorId;

    use super::*;

    fn centro() -> Sector {
        Sector {
            id: SectorId::new(3),
            name: "Sector 3 (Centro)".to_owned(),
            population: 30_000,
            historical_loss_percent: 41.0,
            base_demand: 88.0,
        }
    }

    #[test]
    fn hour_profile_matches_table() {
        assert!((hour_factor(0) - 0.6).abs() < 1e-12);
        assert!((hour_factor(5) - 0.6).abs() < 1e-12);
        assert!((hour_factor(6) - 1.4).abs() < 1e-12);
        assert!((hour_factor(8) - 1.4).abs() < 1e-12);
        assert!((hour_factor(9) - 1.0).abs() < 1e-12);
        assert!((hour_factor(17) - 1.0).abs() < 1e-12);
        assert!((hour_factor(18) - 1.3).abs() < 1e-12);
        assert!((hour_factor(20) - 1.3).abs() < 1e-12);
        assert!((hour_factor(21) - 1.0).abs() < 1e-12);
        assert!((hour_factor(22) - 0.7).abs() < 1e-12);
        assert!((hour_factor(23) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn demand_stays_within_noise_band() {
        let mut generator = DemandGenerator::seeded(7);
        let sector = centro();
        for hour in 0..24_u8 {
            let base = sector.base_demand * hour_factor(hour);
            for _ in 0..50 {
                let demand = generator.generate(hour, &sector);
                assert!(demand >= base * NOISE_MIN - 1e-9, "{demand} below band");
                assert!(demand < base * NOISE_MAX, "{demand} above band");
            }
        }
    }

    #[test]
    fn same_seed_same_demands() {
        let registry = StaticRegistry::sogamoso();
        let mut a = DemandGenerator::seeded(42);
        let mut b = DemandGenerator::seeded(42);
        for hour in [0_u8, 7, 12, 19, 23] {
            assert_eq!(a.generate_all(hour, &registry), b.generate_all(hour, &registry));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let registry = StaticRegistry::sogamoso();
        let mut a = DemandGenerator::seeded(1);
        let mut b = DemandGenerator::seeded(2);
        assert_ne!(a.generate_all(12, &registry), b.generate_all(12, &registry));
    }

    #[test]
    fn generate_all_covers_every_sector() {
        let registry = StaticRegistry::sogamoso();
        let mut generator = DemandGenerator::seeded(3);
        let demands = generator.generate_all(7, &registry);
        assert_eq!(demands.len(), registry.sector_count());
        assert!(demands.iter().all(|d| *d > 0.0));
    }

    #[test]
    fn accepts_injected_rng() {
        let mut generator = DemandGenerator::new(SmallRng::seed_from_u64(11));
        let demand = generator.generate(12, &centro());
        assert!(demand > 0.0);
    }
}
