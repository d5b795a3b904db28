//! The damageable-entity contract and its supporting types.
//!
//! Everything the simulation can hurt (tanks, bases, future structures)
//! implements [`Damageable`]. The registry stores entities exclusively as
//! `Box<dyn Damageable>` handles, so subsystems operate on the capability
//! contract and never on concrete types.
//!
//! # Identity
//!
//! [`EntityId`] is a `u32` newtype. Ids are assigned by the registry at
//! registration time (via [`Damageable::assign_id`], exactly once) and are
//! unique among currently-registered entities. Effects live in a separate id
//! space; see [`EffectId`](crate::effect::EffectId).

pub mod units;

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use units::{Base, Tank};

/// Unique identifier for a registered entity.
///
/// Ordered by numeric value; the registry's `BTreeMap` keyed on this type is
/// what gives the simulation its deterministic iteration order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates an `EntityId` from a raw `u32` value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw `u32` value of this identifier.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Team affiliation of an entity or effect.
///
/// `Neutral` marks unaffiliated objects (free-for-all combatants, unclaimed
/// structures). Friendly-fire policy: damage is withheld only between two
/// matching non-neutral teams; neutral never shields anything.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alliance {
    /// Red team.
    Red,
    /// Blue team.
    Blue,
    /// No team affiliation.
    #[default]
    Neutral,
}

impl Alliance {
    /// Returns `true` if damage between these two affiliations is withheld:
    /// both sides on the same non-neutral team.
    #[must_use]
    pub fn is_allied_with(self, other: Self) -> bool {
        self == other && self != Self::Neutral
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "Red"),
            Self::Blue => write!(f, "Blue"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Attribution carried with every damage application.
///
/// Downstream consumers (scoring, kill feeds, client notification) need to
/// know what hit an entity and on whose behalf; the core threads this through
/// without interpreting it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Instance id of the damage source (projectile or effect id).
    pub source_id: u32,
    /// Descriptor/type id of the damage source.
    pub source_type_id: u32,
    /// The entity on whose behalf the damage was dealt.
    pub owner: EntityId,
}

/// Capability contract for anything that can take damage.
///
/// Implementations must uphold two invariants:
///
/// - health is never negative ([`Damageable::health`] is `u32` and damage
///   saturates at zero);
/// - [`Damageable::is_alive`] is equivalent to `health() > 0`.
///
/// Entities are constructed by game-mode/session logic, shipped to the tick
/// thread through the command queue (hence `Send`), registered into the
/// [`EntityRegistry`](crate::registry::EntityRegistry), mutated in place each
/// tick, and removed on death or disconnect.
pub trait Damageable: Send {
    /// Returns this entity's id. Meaningful only after registration.
    fn id(&self) -> EntityId;

    /// Stamps the id assigned by the registry. Called exactly once, at
    /// registration; implementations need not defend against re-stamping.
    fn assign_id(&mut self, id: EntityId);

    /// Current health. Zero means dead.
    fn health(&self) -> u32;

    /// Whether the entity is alive (`health() > 0`).
    fn is_alive(&self) -> bool {
        self.health() > 0
    }

    /// Current position in world units.
    fn position(&self) -> Vec3;

    /// Moves the entity. Node membership is recomputed by the driver on the
    /// next re-bucket pass, not here.
    fn set_position(&mut self, position: Vec3);

    /// Collision/target radius in world units.
    fn radius(&self) -> f32;

    /// Team affiliation.
    fn team(&self) -> Alliance;

    /// Reassigns the entity to a team.
    fn set_team(&mut self, team: Alliance);

    /// Multiplicative damage reduction in `[0, 1]`: incoming damage is
    /// scaled by `1 - armor_factor` before application.
    fn armor_factor(&self) -> f32;

    /// Applies a direct hit. `damage` has already been through the shared
    /// damage arithmetic (decay and armor); implementations only subtract,
    /// saturating at zero health.
    fn inflict_damage(&mut self, damage: u32, attribution: Attribution);

    /// Applies damage from an environment effect. Defaults to the direct-hit
    /// path; implementations override when environmental damage has distinct
    /// bookkeeping.
    fn inflict_environment_damage(&mut self, damage: u32, attribution: Attribution) {
        self.inflict_damage(damage, attribution);
    }

    /// Copies the externally visible fields into a snapshot that stays valid
    /// across tick boundaries.
    fn state(&self) -> EntityState {
        EntityState {
            id: self.id(),
            health: self.health(),
            position: self.position(),
            radius: self.radius(),
            team: self.team(),
            armor_factor: self.armor_factor(),
            alive: self.is_alive(),
        }
    }
}

/// Copy-of-fields view of an entity, safe to hold across ticks.
///
/// Networking and game-mode logic read these instead of holding references
/// into the registry: the next tick may mutate or remove the entity.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// The entity's id at snapshot time.
    pub id: EntityId,
    /// Health at snapshot time.
    pub health: u32,
    /// Position at snapshot time.
    pub position: Vec3,
    /// Collision/target radius.
    pub radius: f32,
    /// Team affiliation.
    pub team: Alliance,
    /// Armor factor.
    pub armor_factor: f32,
    /// Whether the entity was alive.
    pub alive: bool,
}
