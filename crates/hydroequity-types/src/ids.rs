//! Type-safe identifier wrappers.
//!
//! Sectors are numbered `1..=N` in catalog order. Wrapping the number in a
//! newtype keeps sector ids from being mixed up with positional indices into
//! demand and allocation vectors, which are 0-based.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of a municipal distribution sector (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SectorId(pub u32);

impl SectorId {
    /// Create a sector identifier from its catalog number.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Return the inner catalog number.
    pub const fn into_inner(self) -> u32 {
        self.0
    }

    /// Return the 0-based vector position this id maps to, if any.
    ///
    /// Sector `1` lives at index `0`. Returns `None` for id `0`.
    pub fn index(self) -> Option<usize> {
        let zero_based = self.0.checked_sub(1)?;
        usize::try_from(zero_based).ok()
    }
}

impl core::fmt::Display for SectorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sector-{}", self.0)
    }
}

impl From<u32> for SectorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_zero_based() {
        assert_eq!(SectorId::new(1).index(), Some(0));
        assert_eq!(SectorId::new(10).index(), Some(9));
        assert_eq!(SectorId::new(0).index(), None);
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&SectorId::new(3)).ok();
        assert_eq!(json.as_deref(), Some("3"));
    }

    #[test]
    fn display_is_prefixed() {
        assert_eq!(SectorId::new(7).to_string(), "sector-7");
    }
}
