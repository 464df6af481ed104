//! Error types for the `hydroequity-network` crate.

use hydroequity_types::{SectorId, SourceKind};

/// Errors raised while validating a network catalog.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The catalog has no sectors.
    #[error("catalog must contain at least one sector")]
    NoSectors,

    /// Sector ids must run `1..=N` in catalog order.
    #[error("sector at position {position} has id {found}, expected {expected}")]
    SectorIdOutOfOrder {
        /// 0-based position in the catalog.
        position: usize,
        /// The id found at that position.
        found: SectorId,
        /// The id expected at that position.
        expected: SectorId,
    },

    /// Historical loss must lie in `[0, 100]`.
    #[error("{sector} historical loss {value} is outside [0, 100]")]
    InvalidLoss {
        /// The offending sector.
        sector: SectorId,
        /// The rejected value.
        value: f64,
    },

    /// Base demand must be finite and strictly positive.
    #[error("{sector} base demand {value} must be finite and greater than 0")]
    InvalidDemand {
        /// The offending sector.
        sector: SectorId,
        /// The rejected value.
        value: f64,
    },

    /// Capacities must be finite and non-negative.
    #[error("{entity} capacity {value} must be finite and non-negative")]
    InvalidCapacity {
        /// Name of the source or plant.
        entity: String,
        /// The rejected value.
        value: f64,
    },

    /// Only one source of each kind is supported.
    #[error("duplicate source of kind {0:?}")]
    DuplicateSource(SourceKind),

    /// Too many sectors to number with a `u32`.
    #[error("catalog has too many sectors ({0})")]
    TooManySectors(usize),
}
