//! Clock, tick pass, and orchestration for the Hydroequity simulation.
//!
//! Each tick is one simulated hour. A tick generates demand for the
//! current hour, computes the supply the active scenario leaves
//! available, allocates it twice (proportional baseline and equity
//! allocator), scores both allocations, and records the result.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and hour-of-day derivation.
//! - [`config`] -- Configuration loading from `hydroequity-config.yaml`
//!   into strongly-typed structs.
//! - [`history`] -- Bounded rolling history of equity records.
//! - [`simulation`] -- [`Simulation`], the owner of all mutable state and
//!   the single recomputation pass.
//! - [`operator`] -- Shared control state for pause, speed, stop, and
//!   queued commands.
//! - [`runner`] -- The async loop that drives ticks under operator control.
//!
//! [`Simulation`]: simulation::Simulation

pub mod clock;
pub mod config;
pub mod history;
pub mod operator;
pub mod runner;
pub mod simulation;
