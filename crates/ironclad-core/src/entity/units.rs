//! Concrete damageable units: tanks and bases.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Alliance, Attribution, Damageable, EntityId};

/// Default collision sphere radius of a tank, in world units.
pub const TANK_RADIUS: f32 = 25.0;

/// Collision radius of a base structure, in world units.
pub const BASE_RADIUS: f32 = 35.0;

/// Default health of a freshly built base.
pub const DEFAULT_BASE_HEALTH: u32 = 600;

/// A player-controlled vehicle.
///
/// Construction is builder-flavored: `Tank::new` sets callsign and health,
/// the `at_position` / `on_team` / `with_armor` methods fill in the rest.
///
/// ```
/// use glam::Vec3;
/// use ironclad_core::entity::{Alliance, Damageable, Tank};
///
/// let tank = Tank::new("Rustbucket", 150)
///     .at_position(Vec3::new(320.0, -64.0, 0.0))
///     .on_team(Alliance::Red)
///     .with_armor(0.25);
///
/// assert!(tank.is_alive());
/// assert_eq!(tank.team(), Alliance::Red);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    id: EntityId,
    callsign: String,
    health: u32,
    max_health: u32,
    position: Vec3,
    radius: f32,
    team: Alliance,
    armor_factor: f32,
}

impl Tank {
    /// Creates a tank at the origin with full health and no team.
    ///
    /// The id is a placeholder until the registry stamps a real one.
    #[must_use]
    pub fn new(callsign: impl Into<String>, max_health: u32) -> Self {
        Self {
            id: EntityId::new(0),
            callsign: callsign.into(),
            health: max_health,
            max_health,
            position: Vec3::ZERO,
            radius: TANK_RADIUS,
            team: Alliance::Neutral,
            armor_factor: 0.0,
        }
    }

    /// Places the tank at a position.
    #[must_use]
    pub fn at_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Assigns the tank to a team.
    #[must_use]
    pub fn on_team(mut self, team: Alliance) -> Self {
        self.team = team;
        self
    }

    /// Sets the armor factor (clamped into `[0, 1]`).
    #[must_use]
    pub fn with_armor(mut self, armor_factor: f32) -> Self {
        self.armor_factor = armor_factor.clamp(0.0, 1.0);
        self
    }

    /// Overrides the collision radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    /// The tank's callsign.
    #[must_use]
    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Restores the tank to full health (respawn path).
    pub fn restore(&mut self) {
        self.health = self.max_health;
    }
}

impl Damageable for Tank {
    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn health(&self) -> u32 {
        self.health
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn team(&self) -> Alliance {
        self.team
    }

    fn set_team(&mut self, team: Alliance) {
        self.team = team;
    }

    fn armor_factor(&self) -> f32 {
        self.armor_factor
    }

    fn inflict_damage(&mut self, damage: u32, attribution: Attribution) {
        if !self.is_alive() {
            // Dead tanks take no further hits; no double-kill events.
            return;
        }

        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            debug!(
                tank = %self.callsign,
                source = attribution.source_id,
                owner = %attribution.owner,
                "tank destroyed"
            );
        }
    }
}

/// A static base structure.
///
/// Bases belong to a team, soak damage without armor by default, and sit
/// still: `set_position` relocates them only between rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    id: EntityId,
    health: u32,
    position: Vec3,
    team: Alliance,
    armor_factor: f32,
}

impl Base {
    /// Creates a base with [`DEFAULT_BASE_HEALTH`] at the given position.
    #[must_use]
    pub fn new(position: Vec3, team: Alliance) -> Self {
        Self {
            id: EntityId::new(0),
            health: DEFAULT_BASE_HEALTH,
            position,
            team,
            armor_factor: 0.0,
        }
    }

    /// Overrides starting health.
    #[must_use]
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self
    }

    /// Sets the armor factor (clamped into `[0, 1]`).
    #[must_use]
    pub fn with_armor(mut self, armor_factor: f32) -> Self {
        self.armor_factor = armor_factor.clamp(0.0, 1.0);
        self
    }

    /// Restores the base to a given health value (round reset).
    pub fn set_health(&mut self, health: u32) {
        self.health = health;
    }
}

impl Damageable for Base {
    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn health(&self) -> u32 {
        self.health
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn radius(&self) -> f32 {
        BASE_RADIUS
    }

    fn team(&self) -> Alliance {
        self.team
    }

    fn set_team(&mut self, team: Alliance) {
        self.team = team;
    }

    fn armor_factor(&self) -> f32 {
        self.armor_factor
    }

    fn inflict_damage(&mut self, damage: u32, attribution: Attribution) {
        if !self.is_alive() {
            return;
        }

        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            debug!(
                base = %self.id,
                source = attribution.source_id,
                owner = %attribution.owner,
                "base destroyed"
            );
        }
    }
}
