//! Immutable catalog of sources, treatment plants, and sectors.
//!
//! The registry is built once at startup, validated, and then passed by
//! reference to every component that needs catalog data. Nothing mutates it
//! afterwards.
//!
//! The default catalog describes the Sogamoso supply system: three raw-water
//! sources, three treatment plants, and ten distribution sectors with their
//! historical non-revenue water (IANC) percentages.

use std::collections::BTreeSet;

use hydroequity_types::{Sector, SectorId, Source, SourceKind, TreatmentPlant};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RegistryError;

/// Unvalidated catalog as read from configuration.
///
/// Convert it into a [`StaticRegistry`] with [`StaticRegistry::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCatalog {
    /// Raw-water sources.
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Treatment plants.
    #[serde(default)]
    pub plants: Vec<TreatmentPlant>,
    /// Distribution sectors, ids `1..=N` in order.
    #[serde(default)]
    pub sectors: Vec<Sector>,
}

impl Default for NetworkCatalog {
    fn default() -> Self {
        Self::sogamoso()
    }
}

/// Helper to build a [`Source`].
fn source(kind: SourceKind, name: &str, capacity: f64) -> Source {
    Source {
        kind,
        name: name.to_owned(),
        capacity,
    }
}

/// Helper to build a [`TreatmentPlant`].
fn plant(key: &str, name: &str, capacity: f64, storage: f64) -> TreatmentPlant {
    TreatmentPlant {
        key: key.to_owned(),
        name: name.to_owned(),
        capacity,
        storage,
    }
}

/// Helper to build a [`Sector`].
fn sector(id: u32, name: &str, population: u32, loss: f64, demand: f64) -> Sector {
    Sector {
        id: SectorId::new(id),
        name: name.to_owned(),
        population,
        historical_loss_percent: loss,
        base_demand: demand,
    }
}

impl NetworkCatalog {
    /// The Sogamoso supply system.
    pub fn sogamoso() -> Self {
        Self {
            sources: vec![
                source(SourceKind::Lake, "Lago Tota", 250.0),
                source(SourceKind::River, "Río Tejar", 15.0),
                source(SourceKind::DeepWell, "Pozo Profundo", 10.0),
            ],
            plants: vec![
                plant("chacon", "El Chacón", 365.0, 10_000.0),
                plant("sur", "El Sur", 60.0, 0.0),
                plant("mode", "El Mode", 30.0, 856.0),
            ],
            sectors: vec![
                sector(1, "Sector 1 (Sur)", 10_000, 71.0, 60.0),
                sector(2, "Sector 2", 6_000, 4.0, 35.0),
                sector(3, "Sector 3 (Centro)", 30_000, 41.0, 88.0),
                sector(4, "Sector 4", 25_000, 26.0, 75.0),
                sector(5, "Sector 5 (Mode Rural)", 4_000, 62.0, 15.0),
                sector(6, "Sector 6", 2_000, 43.0, 9.0),
                sector(7, "Sector 7", 2_000, 9.0, 10.0),
                sector(8, "Sector 8 (Norte)", 22_000, 38.0, 72.0),
                sector(9, "Sector 9", 7_000, 44.0, 20.0),
                sector(10, "Sector 10 (Santa Bárbara)", 3_000, 39.0, 11.0),
            ],
        }
    }
}

/// Validated, immutable catalog shared by every simulation component.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticRegistry {
    sources: Vec<Source>,
    plants: Vec<TreatmentPlant>,
    sectors: Vec<Sector>,
}

impl StaticRegistry {
    /// Validate a catalog and freeze it into a registry.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] describing the first invalid entry.
    pub fn new(catalog: NetworkCatalog) -> Result<Self, RegistryError> {
        validate(&catalog)?;
        debug!(
            sources = catalog.sources.len(),
            plants = catalog.plants.len(),
            sectors = catalog.sectors.len(),
            "Network catalog validated"
        );
        Ok(Self {
            sources: catalog.sources,
            plants: catalog.plants,
            sectors: catalog.sectors,
        })
    }

    /// The default Sogamoso registry.
    pub fn sogamoso() -> Self {
        let catalog = NetworkCatalog::sogamoso();
        Self {
            sources: catalog.sources,
            plants: catalog.plants,
            sectors: catalog.sectors,
        }
    }

    /// All sources in catalog order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// All treatment plants in catalog order.
    pub fn plants(&self) -> &[TreatmentPlant] {
        &self.plants
    }

    /// All sectors, ordered by id.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Number of sectors (the length of every demand and allocation vector).
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Look up a sector by id.
    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id.index()?)
    }

    /// Look up the source of a given kind.
    pub fn source(&self, kind: SourceKind) -> Option<&Source> {
        self.sources.iter().find(|s| s.kind == kind)
    }

    /// Base demand of every sector: the representative demand snapshot
    /// used for training.
    pub fn base_demands(&self) -> Vec<f64> {
        self.sectors.iter().map(|s| s.base_demand).collect()
    }

    /// `1 - loss / 100` for every sector.
    pub fn loss_factors(&self) -> Vec<f64> {
        self.sectors.iter().map(Sector::loss_factor).collect()
    }

    /// Sum of nominal source capacities.
    pub fn total_capacity(&self) -> f64 {
        self.sources.iter().map(|s| s.capacity).sum()
    }

    /// Total population served.
    pub fn total_population(&self) -> u64 {
        self.sectors
            .iter()
            .map(|s| u64::from(s.population))
            .fold(0_u64, u64::saturating_add)
    }

    /// Return an owned copy of the catalog (for serialization).
    pub fn to_catalog(&self) -> NetworkCatalog {
        NetworkCatalog {
            sources: self.sources.clone(),
            plants: self.plants.clone(),
            sectors: self.sectors.clone(),
        }
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::sogamoso()
    }
}

/// Check every catalog invariant.
fn validate(catalog: &NetworkCatalog) -> Result<(), RegistryError> {
    if catalog.sectors.is_empty() {
        return Err(RegistryError::NoSectors);
    }

    for (position, entry) in catalog.sectors.iter().enumerate() {
        let expected = u32::try_from(position)
            .ok()
            .and_then(|p| p.checked_add(1))
            .ok_or(RegistryError::TooManySectors(catalog.sectors.len()))?;
        if entry.id != SectorId::new(expected) {
            return Err(RegistryError::SectorIdOutOfOrder {
                position,
                found: entry.id,
                expected: SectorId::new(expected),
            });
        }
        if !(0.0..=100.0).contains(&entry.historical_loss_percent) {
            return Err(RegistryError::InvalidLoss {
                sector: entry.id,
                value: entry.historical_loss_percent,
            });
        }
        if !entry.base_demand.is_finite() || entry.base_demand <= 0.0 {
            return Err(RegistryError::InvalidDemand {
                sector: entry.id,
                value: entry.base_demand,
            });
        }
    }

    let mut kinds = BTreeSet::new();
    for src in &catalog.sources {
        check_capacity(&src.name, src.capacity)?;
        if !kinds.insert(src.kind) {
            return Err(RegistryError::DuplicateSource(src.kind));
        }
    }

    for p in &catalog.plants {
        check_capacity(&p.name, p.capacity)?;
        check_capacity(&p.name, p.storage)?;
    }

    Ok(())
}

fn check_capacity(entity: &str, value: f64) -> Result<(), RegistryError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RegistryError::InvalidCapacity {
            entity: entity.to_owned(),
            value,
        })
    }
}
