//! Scenario tests for the simulation core.
//!
//! Unit tests live next to the code they cover; this module holds the
//! cross-subsystem scenarios: full join/move/spawn/tick passes, grid
//! walks, effect lifecycles, and the capacity/overlap edge cases.
//!
//! # Test Structure
//!
//! - `scenarios.rs`: end-to-end walks through driver, registry, grid, and
//!   effect engine together
//! - `helpers.rs`: factory functions shared by the scenarios

mod helpers;

pub use helpers::*;
