//! # Ironclad Core
//!
//! Authoritative simulation core for the Ironclad arena combat server.
//!
//! This crate tracks every damageable entity in a shared arena, applies
//! direct and area-of-effect damage, and partitions the play-field so that
//! per-tick work stays proportional to local activity rather than total
//! player count.
//!
//! ## Subsystems
//!
//! - **Entities**: the [`entity::Damageable`] contract and concrete units
//!   (tanks, bases)
//! - **Registry**: id-stable ownership of every entity
//!   ([`registry::EntityRegistry`])
//! - **Spatial grid**: fixed-cell partitioning, re-exported from
//!   [`gridiron`]
//! - **Effects**: timed area hazards ([`effect::EffectEngine`])
//! - **Driver**: the per-tick orchestrator ([`simulation::Simulation`])
//!
//! ## Usage
//!
//! ```
//! use ironclad_core::command::Command;
//! use ironclad_core::entity::Tank;
//! use ironclad_core::simulation::{Simulation, SimulationConfig};
//!
//! let (mut sim, sender) = Simulation::new(SimulationConfig::default())?;
//!
//! // Session logic enqueues a join; the next tick applies it.
//! sender.send(Command::Join(Box::new(Tank::new("Rustbucket", 100)))).unwrap();
//! let summary = sim.tick(1.0 / 30.0)?;
//! assert_eq!(summary.entities, 1);
//! # Ok::<(), ironclad_core::SimError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export the spatial crate for grid queries
pub use gridiron;

pub mod combat;
pub mod command;
pub mod descriptor;
pub mod effect;
pub mod entity;
pub mod error;
pub mod registry;
pub mod simulation;

// Re-exports for convenience
pub use command::Command;
pub use descriptor::{Arsenal, EnvironmentProperty, Projectile, SpawnFlags, Weapon};
pub use effect::{ActiveEffect, EffectEngine, EffectId};
pub use entity::{Alliance, Attribution, Base, Damageable, EntityId, EntityState, Tank};
pub use error::{IdNamespace, SimError};
pub use registry::EntityRegistry;
pub use simulation::{Simulation, SimulationConfig, TickSummary};

#[cfg(test)]
mod tests;
