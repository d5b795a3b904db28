//! Immutable weapon, projectile, and environment-effect descriptors.
//!
//! Descriptors are produced by an external configuration loader and handed
//! to the core fully populated; the core never parses configuration itself.
//! They are looked up by integer id through the [`Arsenal`] once at spawn
//! time and shared as `Arc`s from then on.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

bitflags::bitflags! {
    /// Conditions under which a projectile or expiring effect spawns an
    /// environment effect.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SpawnFlags: u8 {
        /// Spawn when the carrying projectile hits a wall.
        const ON_WALL_HIT = 1;
        /// Spawn when the carrying projectile hits a player.
        const ON_PLAYER_HIT = 1 << 1;
        /// Spawn a successor when the effect itself expires.
        const ON_EXPIRATION = 1 << 2;
    }
}

/// Static description of an area-hazard environment effect.
///
/// An active effect damages everything inside `radius` once per
/// `interval_seconds`, rolling its base damage uniformly in
/// `[minimum_damage, maximum_damage]`, and expires after
/// `duration_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentProperty {
    /// Descriptor id, unique among environment properties.
    pub id: u32,
    /// Human-readable name ("Napalm", "Acid Pool").
    pub name: String,
    /// When this effect is spawned by a carrier or by its own expiry.
    pub spawn: SpawnFlags,
    /// Lifetime of an active effect, in seconds.
    pub duration_seconds: f32,
    /// Minimum time between damage applications, in seconds.
    pub interval_seconds: f32,
    /// Area-of-effect radius in world units.
    pub radius: f32,
    /// Damage multiplier at the rim of the area: `1.0` deals full damage
    /// everywhere, `0.0` fades to nothing at the edge.
    pub decay: f32,
    /// Lower bound of the base damage roll.
    pub minimum_damage: u32,
    /// Upper bound of the base damage roll.
    pub maximum_damage: u32,
}

/// Static description of a projectile in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Descriptor id, unique among projectiles.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// Blast radius on impact; zero for single-target rounds.
    pub aoe_radius: f32,
    /// Rim damage multiplier for the blast, as in
    /// [`EnvironmentProperty::decay`].
    pub aoe_decay: f32,
    /// Lower bound of the impact damage roll.
    pub minimum_damage: u32,
    /// Upper bound of the impact damage roll.
    pub maximum_damage: u32,
    /// Muzzle velocity in world units per second.
    pub initial_velocity: f32,
    /// Velocity ceiling in world units per second.
    pub terminal_velocity: f32,
    /// Acceleration in world units per second squared.
    pub acceleration: f32,
    /// Maximum travel distance in world units.
    pub range: u32,
    /// Radius used for wall and body collision checks.
    pub collision_radius: f32,
    /// Environment property spawned on impact or expiry, if any.
    pub environment: Option<u32>,
}

/// Static description of a weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Descriptor id, unique among weapons.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
    /// Seconds between shots.
    pub cooldown_seconds: f32,
    /// Projectiles launched per trigger pull.
    pub projectiles_per_shot: u32,
    /// Seconds between projectiles within one shot.
    pub interval_between_projectiles_seconds: f32,
    /// The projectile descriptor this weapon fires.
    pub projectile: u32,
}

/// Id-keyed lookup table of all loaded descriptors.
///
/// Populated once at match setup by the configuration layer; the simulation
/// only ever reads it.
#[derive(Debug, Clone, Default)]
pub struct Arsenal {
    environments: HashMap<u32, Arc<EnvironmentProperty>>,
    projectiles: HashMap<u32, Arc<Projectile>>,
    weapons: HashMap<u32, Arc<Weapon>>,
}

impl Arsenal {
    /// Creates an empty arsenal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an environment property, replacing any previous descriptor
    /// with the same id.
    pub fn add_environment(&mut self, property: EnvironmentProperty) {
        self.environments.insert(property.id, Arc::new(property));
    }

    /// Registers a projectile descriptor.
    pub fn add_projectile(&mut self, projectile: Projectile) {
        self.projectiles.insert(projectile.id, Arc::new(projectile));
    }

    /// Registers a weapon descriptor.
    pub fn add_weapon(&mut self, weapon: Weapon) {
        self.weapons.insert(weapon.id, Arc::new(weapon));
    }

    /// Looks up an environment property by id.
    #[must_use]
    pub fn environment(&self, id: u32) -> Option<Arc<EnvironmentProperty>> {
        self.environments.get(&id).cloned()
    }

    /// Looks up an environment property, surfacing a typed error on a miss.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownDescriptor`] if no property carries the id.
    pub fn require_environment(&self, id: u32) -> Result<Arc<EnvironmentProperty>, SimError> {
        self.environment(id).ok_or(SimError::UnknownDescriptor { id })
    }

    /// Looks up a projectile descriptor by id.
    #[must_use]
    pub fn projectile(&self, id: u32) -> Option<Arc<Projectile>> {
        self.projectiles.get(&id).cloned()
    }

    /// Looks up a weapon descriptor by id.
    #[must_use]
    pub fn weapon(&self, id: u32) -> Option<Arc<Weapon>> {
        self.weapons.get(&id).cloned()
    }
}
