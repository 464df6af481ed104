//! Static catalog, demand synthesis, and source availability for the
//! Hydroequity simulation.
//!
//! This crate models the supply and demand sides of the distribution
//! network as abstract numbers: sources have a capacity, sectors have a
//! base demand. There is no hydraulic model.
//!
//! # Modules
//!
//! - [`registry`] -- [`StaticRegistry`], the validated immutable catalog of
//!   sources, treatment plants, and sectors, plus the default Sogamoso
//!   catalog.
//! - [`demand`] -- Hour-of-day demand synthesis with bounded noise drawn
//!   from an injected RNG.
//! - [`availability`] -- Scenario factors per source kind and the total
//!   supply available for allocation.
//! - [`error`] -- Error types for catalog construction.

pub mod availability;
pub mod demand;
pub mod error;
pub mod registry;

// Re-export primary types at crate root.
pub use availability::{AvailabilityModel, scenario_factor};
pub use demand::{DemandGenerator, hour_factor};
pub use error::RegistryError;
pub use registry::{NetworkCatalog, StaticRegistry};
