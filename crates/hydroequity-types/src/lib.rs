//! Shared type definitions for the Hydroequity simulation.
//!
//! This crate is the single source of truth for the types exchanged between
//! the allocation engine and the observer surface. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe sector identifier
//! - [`enums`] -- Scenarios, source kinds, satisfaction bands
//! - [`structs`] -- Catalog entries, availability, metrics, snapshots, history

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{SatisfactionBand, Scenario, SourceKind};
pub use ids::SectorId;
pub use structs::{
    Availability, EquityMetricsResult, HistoryRecord, Sector, SectorView, Source,
    SourceAvailability, TickSnapshot, TreatmentPlant,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the `.ts` files to `bindings/` relative to the crate
        // root when `export_all` is called.
        use ts_rs::TS;

        let _ = crate::ids::SectorId::export_all();

        let _ = crate::enums::Scenario::export_all();
        let _ = crate::enums::SourceKind::export_all();
        let _ = crate::enums::SatisfactionBand::export_all();

        let _ = crate::structs::Source::export_all();
        let _ = crate::structs::TreatmentPlant::export_all();
        let _ = crate::structs::Sector::export_all();
        let _ = crate::structs::SourceAvailability::export_all();
        let _ = crate::structs::Availability::export_all();
        let _ = crate::structs::EquityMetricsResult::export_all();
        let _ = crate::structs::SectorView::export_all();
        let _ = crate::structs::TickSnapshot::export_all();
        let _ = crate::structs::HistoryRecord::export_all();
    }
}
