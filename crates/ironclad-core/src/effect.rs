//! The environment-effect engine: timed area hazards that deal periodic
//! damage.
//!
//! Effects are spawned by weapon impacts (or by an expiring effect's own
//! descriptor) and live in an id space independent of entities. Every tick
//! the engine advances each effect's clock, applies damage to whatever the
//! effect covers, and retires effects past their duration.
//!
//! Candidate targets come from the spatial grid: only occupants of nodes
//! the effect's circle touches are considered, so per-effect cost is
//! bounded by local density, not arena population.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use gridiron::NodeGrid;

use crate::combat::{aoe_damage, circles_overlap, effective_damage, planar_distance, roll_damage};
use crate::descriptor::{EnvironmentProperty, SpawnFlags};
use crate::entity::{Alliance, Attribution, EntityId};
use crate::error::{IdNamespace, SimError};
use crate::registry::{EntityRegistry, ID_MARGIN};

// =============================================================================
// Effect identity
// =============================================================================

/// Unique identifier for an active environment effect.
///
/// Effects and entities are separate id namespaces; an `EffectId` never
/// indexes the registry.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct EffectId(u32);

impl EffectId {
    /// Creates an `EffectId` from a raw `u32` value.
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

impl fmt::Debug for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectId({})", self.0)
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Active effects
// =============================================================================

/// One active area hazard on the map.
///
/// Time is tick-relative: [`ActiveEffect::advance`] accumulates the tick
/// delta into `elapsed` (total lifetime) and `since_damage` (time since the
/// last damage application). Damage fires at most once per configured
/// interval; expiry is exactly once, when `elapsed` reaches the duration.
#[derive(Debug, Clone)]
pub struct ActiveEffect {
    id: EffectId,
    property: Arc<EnvironmentProperty>,
    team: Alliance,
    position: Vec3,
    owner: EntityId,
    elapsed: f32,
    since_damage: f32,
}

impl ActiveEffect {
    fn new(
        id: EffectId,
        property: Arc<EnvironmentProperty>,
        team: Alliance,
        position: Vec3,
        owner: EntityId,
    ) -> Self {
        Self {
            id,
            property,
            team,
            position,
            owner,
            elapsed: 0.0,
            since_damage: 0.0,
        }
    }

    /// This effect's id.
    #[must_use]
    pub const fn id(&self) -> EffectId {
        self.id
    }

    /// The descriptor this effect was spawned from.
    #[must_use]
    pub fn property(&self) -> &Arc<EnvironmentProperty> {
        &self.property
    }

    /// Team on whose behalf the effect deals damage.
    #[must_use]
    pub const fn team(&self) -> Alliance {
        self.team
    }

    /// Center of the area of effect.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// The entity that caused this effect to exist.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Area-of-effect radius, straight from the descriptor.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.property.radius
    }

    /// Seconds this effect has been alive.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advances both clocks by the tick delta.
    fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        self.since_damage += dt;
    }

    /// Whether enough time has passed since the last damage application.
    fn interval_ready(&self) -> bool {
        self.since_damage >= self.property.interval_seconds
    }

    /// Consumes one damage interval, carrying the remainder so a slow tick
    /// does not drift the schedule.
    fn consume_interval(&mut self) {
        if self.property.interval_seconds > 0.0 {
            self.since_damage -= self.property.interval_seconds;
        } else {
            self.since_damage = 0.0;
        }
    }

    /// Whether this effect has outlived its duration.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.elapsed >= self.property.duration_seconds
    }
}

// =============================================================================
// Effect engine
// =============================================================================

/// Owns and updates every active environment effect.
///
/// # Overlap policy
///
/// The policy is engine-wide, not per effect: with overlap disallowed
/// (the default), [`EffectEngine::spawn`] rejects a new effect whose circle
/// intersects any active effect's circle with
/// [`SimError::OverlapConflict`], an expected outcome, signaled to the
/// caller and never logged as an error.
///
/// # Determinism
///
/// Effects live in a `BTreeMap` and are updated in ascending-id order, and
/// damage rolls come from a `ChaCha8Rng` seeded at construction, so a given
/// seed and command sequence replays identically.
pub struct EffectEngine {
    effects: BTreeMap<EffectId, ActiveEffect>,
    allow_overlap: bool,
    margin: u32,
    rng: ChaCha8Rng,
}

impl fmt::Debug for EffectEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectEngine")
            .field("effects", &format!("[{} active]", self.effects.len()))
            .field("allow_overlap", &self.allow_overlap)
            .field("margin", &self.margin)
            .finish()
    }
}

impl EffectEngine {
    /// Creates an engine with the default id margin.
    ///
    /// `seed` fixes the damage-roll sequence; `allow_overlap` sets the
    /// engine-wide overlap policy.
    #[must_use]
    pub fn new(seed: u64, allow_overlap: bool) -> Self {
        Self::with_margin(seed, allow_overlap, ID_MARGIN)
    }

    /// Creates an engine with an explicit id margin (see
    /// [`EntityRegistry::with_margin`](crate::registry::EntityRegistry::with_margin)).
    #[must_use]
    pub fn with_margin(seed: u64, allow_overlap: bool, margin: u32) -> Self {
        Self {
            effects: BTreeMap::new(),
            allow_overlap,
            margin,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Spawns a new effect at a position.
    ///
    /// # Errors
    ///
    /// - [`SimError::OverlapConflict`] if overlap is disallowed and the new
    ///   area intersects an active effect's area. The active-effect set is
    ///   unchanged.
    /// - [`SimError::CapacityExhausted`] if the effect id space has no free
    ///   id within the margin window.
    pub fn spawn(
        &mut self,
        property: Arc<EnvironmentProperty>,
        team: Alliance,
        position: Vec3,
        owner: EntityId,
    ) -> Result<EffectId, SimError> {
        if !self.allow_overlap {
            if let Some(blocking) = self
                .effects
                .values()
                .find(|active| {
                    circles_overlap(position, property.radius, active.position, active.radius())
                })
                .map(ActiveEffect::id)
            {
                return Err(SimError::OverlapConflict { blocking });
            }
        }

        let id = self.generate_unique_id()?;
        self.effects.insert(
            id,
            ActiveEffect::new(id, property, team, position, owner),
        );
        debug!(effect = %id, x = position.x, y = position.y, "effect spawned");

        Ok(id)
    }

    /// Assigns the smallest unused effect id in `[0, len() + margin)`.
    fn generate_unique_id(&self) -> Result<EffectId, SimError> {
        let live = u32::try_from(self.effects.len()).unwrap_or(u32::MAX);
        let window = live.saturating_add(self.margin);

        (0..window)
            .map(EffectId::new)
            .find(|candidate| !self.effects.contains_key(candidate))
            .ok_or(SimError::CapacityExhausted {
                namespace: IdNamespace::Effect,
            })
    }

    /// Advances every active effect by the tick delta and applies interval
    /// damage through the damageable contract.
    ///
    /// For each effect whose damage interval elapsed, candidates are the
    /// occupants of grid nodes overlapping the effect's circle, filtered to
    /// living, non-owner, non-allied entities whose collision circle
    /// actually intersects the effect. Damage is rolled once per effect per
    /// interval, then per target scaled by distance decay and armor.
    ///
    /// Effects past their duration are removed after the damage pass; a
    /// removed effect whose descriptor carries
    /// [`SpawnFlags::ON_EXPIRATION`] spawns a successor at the same
    /// position. A successor blocked by the overlap policy is dropped, a
    /// normal outcome, logged at debug level.
    ///
    /// # Errors
    ///
    /// [`SimError::CapacityExhausted`] if a successor spawn finds no free
    /// effect id; the offending spawn is abandoned and the error reported
    /// upward.
    pub fn update(
        &mut self,
        dt: f32,
        registry: &mut EntityRegistry,
        grid: &NodeGrid,
    ) -> Result<(), SimError> {
        let mut expired = Vec::new();

        for effect in self.effects.values_mut() {
            effect.advance(dt);

            if effect.interval_ready() {
                effect.consume_interval();

                let property = Arc::clone(&effect.property);
                let base = roll_damage(
                    &mut self.rng,
                    property.minimum_damage,
                    property.maximum_damage,
                );

                // Occupant sets of distinct nodes are disjoint, so the
                // concatenation is already duplicate-free.
                let candidates: Vec<u32> = grid
                    .nodes_overlapping(effect.position, property.radius)
                    .into_iter()
                    .flat_map(|node| grid.occupants(node))
                    .collect();

                for occupant in candidates {
                    let target_id = EntityId::new(occupant);
                    if target_id == effect.owner {
                        continue;
                    }
                    let Some(target) = registry.get_mut(target_id) else {
                        continue;
                    };
                    if !target.is_alive() {
                        continue;
                    }
                    if effect.team.is_allied_with(target.team()) {
                        continue;
                    }
                    if !circles_overlap(
                        target.position(),
                        target.radius(),
                        effect.position,
                        property.radius,
                    ) {
                        continue;
                    }

                    let distance = planar_distance(target.position(), effect.position);
                    let decayed = aoe_damage(base, property.decay, property.radius, distance);
                    let damage = effective_damage(decayed, target.armor_factor());
                    if damage == 0 {
                        continue;
                    }

                    target.inflict_environment_damage(
                        damage,
                        Attribution {
                            source_id: effect.id.as_u32(),
                            source_type_id: property.id,
                            owner: effect.owner,
                        },
                    );
                    debug!(
                        effect = %effect.id,
                        target = %target_id,
                        damage,
                        killed = !target.is_alive(),
                        "effect hit"
                    );
                }
            }

            if effect.expired() {
                expired.push(effect.id);
            }
        }

        for id in expired {
            let Some(effect) = self.effects.remove(&id) else {
                continue;
            };
            debug!(effect = %id, "effect expired");

            if effect.property.spawn.contains(SpawnFlags::ON_EXPIRATION) {
                // The predecessor is already out of the set, so the
                // successor can never conflict with it.
                match self.spawn(
                    Arc::clone(&effect.property),
                    effect.team,
                    effect.position,
                    effect.owner,
                ) {
                    Ok(successor) => {
                        debug!(predecessor = %id, successor = %successor, "successor spawned");
                    }
                    Err(SimError::OverlapConflict { blocking }) => {
                        debug!(predecessor = %id, %blocking, "successor blocked by overlap");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Ok(())
    }

    /// Administrative removal, independent of natural expiration. Returns
    /// whether an effect was removed.
    pub fn remove(&mut self, id: EffectId) -> bool {
        self.effects.remove(&id).is_some()
    }

    /// Returns an active effect by id.
    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&ActiveEffect> {
        self.effects.get(&id)
    }

    /// Iterates active effects in ascending-id order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> + '_ {
        self.effects.values()
    }

    /// Number of active effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Returns `true` if no effect is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Drops every active effect (between matches/rounds).
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Changes the engine-wide overlap policy.
    pub fn set_allow_overlap(&mut self, value: bool) {
        self.allow_overlap = value;
    }

    /// Current overlap policy.
    #[must_use]
    pub const fn allows_overlap(&self) -> bool {
        self.allow_overlap
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Damageable, Tank};
    use gridiron::GridConfig;

    const NO_OWNER: EntityId = EntityId::new(u32::MAX);

    fn property(duration: f32, interval: f32, radius: f32) -> Arc<EnvironmentProperty> {
        Arc::new(EnvironmentProperty {
            id: 1,
            name: "Test Fire".to_owned(),
            spawn: SpawnFlags::empty(),
            duration_seconds: duration,
            interval_seconds: interval,
            radius,
            decay: 1.0,
            minimum_damage: 10,
            maximum_damage: 10,
        })
    }

    fn chaining_property() -> Arc<EnvironmentProperty> {
        Arc::new(EnvironmentProperty {
            id: 2,
            name: "Smolder".to_owned(),
            spawn: SpawnFlags::ON_EXPIRATION,
            duration_seconds: 1.0,
            interval_seconds: 0.5,
            radius: 50.0,
            decay: 1.0,
            minimum_damage: 5,
            maximum_damage: 5,
        })
    }

    fn arena() -> (EntityRegistry, NodeGrid) {
        let mut grid = NodeGrid::new();
        grid.configure(GridConfig {
            arena_width: 2048.0,
            arena_height: 2048.0,
            node_dimension: 512.0,
        })
        .unwrap();
        (EntityRegistry::new(), grid)
    }

    fn place_tank(
        registry: &mut EntityRegistry,
        grid: &mut NodeGrid,
        tank: Tank,
    ) -> EntityId {
        let position = tank.position();
        let id = registry.register(Box::new(tank)).unwrap();
        let _ = grid.process_position(id.as_u32(), position);
        id
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn spawn_assigns_sequential_ids() {
            let mut engine = EffectEngine::new(0, true);
            let prop = property(5.0, 1.0, 50.0);

            let a = engine
                .spawn(Arc::clone(&prop), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            let b = engine
                .spawn(prop, Alliance::Neutral, Vec3::new(500.0, 0.0, 0.0), NO_OWNER)
                .unwrap();

            assert_eq!(a, EffectId::new(0));
            assert_eq!(b, EffectId::new(1));
            assert_eq!(engine.len(), 2);
        }

        #[test]
        fn freed_effect_ids_are_reused() {
            let mut engine = EffectEngine::new(0, true);
            let prop = property(5.0, 1.0, 50.0);

            let a = engine
                .spawn(Arc::clone(&prop), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            engine.remove(a);

            let again = engine
                .spawn(prop, Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            assert_eq!(again, a);
        }

        #[test]
        fn overlap_disallowed_rejects_intersecting_spawn() {
            let mut engine = EffectEngine::new(0, false);
            let prop = property(5.0, 1.0, 50.0);

            let first = engine
                .spawn(Arc::clone(&prop), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            let result = engine.spawn(
                prop,
                Alliance::Neutral,
                Vec3::new(80.0, 0.0, 0.0),
                NO_OWNER,
            );

            assert_eq!(result, Err(SimError::OverlapConflict { blocking: first }));
            assert_eq!(engine.len(), 1);
        }

        #[test]
        fn overlap_disallowed_accepts_disjoint_spawn() {
            let mut engine = EffectEngine::new(0, false);
            let prop = property(5.0, 1.0, 50.0);

            engine
                .spawn(Arc::clone(&prop), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            let result = engine.spawn(
                prop,
                Alliance::Neutral,
                Vec3::new(200.0, 0.0, 0.0),
                NO_OWNER,
            );

            assert!(result.is_ok());
            assert_eq!(engine.len(), 2);
        }

        #[test]
        fn overlap_allowed_stacks_effects() {
            let mut engine = EffectEngine::new(0, true);
            let prop = property(5.0, 1.0, 50.0);

            engine
                .spawn(Arc::clone(&prop), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            assert!(engine
                .spawn(prop, Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .is_ok());
        }

        #[test]
        fn zero_margin_exhausts_effect_ids() {
            let mut engine = EffectEngine::with_margin(0, true, 0);
            let result = engine.spawn(
                property(5.0, 1.0, 50.0),
                Alliance::Neutral,
                Vec3::ZERO,
                NO_OWNER,
            );
            assert_eq!(
                result,
                Err(SimError::CapacityExhausted {
                    namespace: IdNamespace::Effect,
                })
            );
            assert!(engine.is_empty());
        }
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn interval_damage_fires_once_per_interval() {
            let (mut registry, mut grid) = arena();
            let tank_id = place_tank(&mut registry, &mut grid, Tank::new("victim", 100));

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();

            // Half an interval: no damage yet.
            engine.update(0.5, &mut registry, &grid).unwrap();
            assert_eq!(registry.get(tank_id).unwrap().health(), 100);

            // Interval reached: exactly one application.
            engine.update(0.5, &mut registry, &grid).unwrap();
            assert_eq!(registry.get(tank_id).unwrap().health(), 90);

            // Sub-interval follow-up: still one application.
            engine.update(0.25, &mut registry, &grid).unwrap();
            assert_eq!(registry.get(tank_id).unwrap().health(), 90);
        }

        #[test]
        fn effect_lifecycle_two_ticks_then_expiry() {
            let (mut registry, mut grid) = arena();
            let tank_id = place_tank(&mut registry, &mut grid, Tank::new("victim", 100));

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();

            engine.update(1.0, &mut registry, &grid).unwrap();
            assert_eq!(registry.get(tank_id).unwrap().health(), 90);
            assert_eq!(engine.len(), 1);

            engine.update(1.0, &mut registry, &grid).unwrap();
            assert_eq!(registry.get(tank_id).unwrap().health(), 80);
            // Duration reached: removed, exactly once.
            assert_eq!(engine.len(), 0);
        }

        #[test]
        fn out_of_range_entity_is_untouched() {
            let (mut registry, mut grid) = arena();
            let far_id = place_tank(
                &mut registry,
                &mut grid,
                Tank::new("far", 100).at_position(Vec3::new(1500.0, -1500.0, 0.0)),
            );

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            engine.update(1.0, &mut registry, &grid).unwrap();

            assert_eq!(registry.get(far_id).unwrap().health(), 100);
        }

        #[test]
        fn same_node_but_outside_radius_is_untouched() {
            let (mut registry, mut grid) = arena();
            let near_miss = place_tank(
                &mut registry,
                &mut grid,
                Tank::new("near", 100).at_position(Vec3::new(200.0, 0.0, 0.0)),
            );

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            engine.update(1.0, &mut registry, &grid).unwrap();

            assert_eq!(registry.get(near_miss).unwrap().health(), 100);
        }

        #[test]
        fn friendly_fire_is_withheld_between_teams() {
            let (mut registry, mut grid) = arena();
            let friend = place_tank(
                &mut registry,
                &mut grid,
                Tank::new("friend", 100).on_team(Alliance::Red),
            );
            let foe = place_tank(
                &mut registry,
                &mut grid,
                Tank::new("foe", 100)
                    .on_team(Alliance::Blue)
                    .at_position(Vec3::new(30.0, 0.0, 0.0)),
            );

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Red, Vec3::ZERO, NO_OWNER)
                .unwrap();
            engine.update(1.0, &mut registry, &grid).unwrap();

            assert_eq!(registry.get(friend).unwrap().health(), 100);
            assert!(registry.get(foe).unwrap().health() < 100);
        }

        #[test]
        fn neutral_targets_are_never_shielded() {
            let (mut registry, mut grid) = arena();
            let neutral = place_tank(&mut registry, &mut grid, Tank::new("bystander", 100));

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            engine.update(1.0, &mut registry, &grid).unwrap();

            assert!(registry.get(neutral).unwrap().health() < 100);
        }

        #[test]
        fn owner_is_immune_to_own_effect() {
            let (mut registry, mut grid) = arena();
            let owner = place_tank(&mut registry, &mut grid, Tank::new("owner", 100));

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, owner)
                .unwrap();
            engine.update(1.0, &mut registry, &grid).unwrap();

            assert_eq!(registry.get(owner).unwrap().health(), 100);
        }

        #[test]
        fn dead_entity_is_not_processed() {
            let (mut registry, mut grid) = arena();
            let dead = place_tank(&mut registry, &mut grid, Tank::new("dead", 100));
            registry.get_mut(dead).unwrap().inflict_damage(
                100,
                Attribution {
                    source_id: 0,
                    source_type_id: 0,
                    owner: NO_OWNER,
                },
            );

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            engine.update(1.0, &mut registry, &grid).unwrap();

            assert_eq!(registry.get(dead).unwrap().health(), 0);
            assert!(!registry.get(dead).unwrap().is_alive());
        }

        #[test]
        fn armor_scales_damage() {
            let (mut registry, mut grid) = arena();
            let armored = place_tank(
                &mut registry,
                &mut grid,
                Tank::new("armored", 100).with_armor(0.5),
            );

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            engine.update(1.0, &mut registry, &grid).unwrap();

            // Base 10, armor halves it.
            assert_eq!(registry.get(armored).unwrap().health(), 95);
        }

        #[test]
        fn fully_armored_target_is_untouched() {
            let (mut registry, mut grid) = arena();
            let immune = place_tank(
                &mut registry,
                &mut grid,
                Tank::new("immune", 100).with_armor(1.0),
            );

            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(2.0, 1.0, 60.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();
            engine.update(1.0, &mut registry, &grid).unwrap();

            assert_eq!(registry.get(immune).unwrap().health(), 100);
        }

        #[test]
        fn same_seed_same_damage_sequence() {
            let run = |seed: u64| {
                let (mut registry, mut grid) = arena();
                let tank_id = place_tank(&mut registry, &mut grid, Tank::new("victim", 1000));

                let mut engine = EffectEngine::new(seed, true);
                let prop = Arc::new(EnvironmentProperty {
                    minimum_damage: 1,
                    maximum_damage: 50,
                    ..(*property(10.0, 1.0, 60.0)).clone()
                });
                engine
                    .spawn(prop, Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                    .unwrap();

                for _ in 0..5 {
                    engine.update(1.0, &mut registry, &grid).unwrap();
                }
                registry.get(tank_id).unwrap().health()
            };

            assert_eq!(run(42), run(42));
        }
    }

    mod expiry_tests {
        use super::*;

        #[test]
        fn expired_effect_is_removed_exactly_once() {
            let (mut registry, grid) = arena();
            let mut engine = EffectEngine::new(0, true);
            engine
                .spawn(property(1.0, 10.0, 50.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();

            engine.update(0.5, &mut registry, &grid).unwrap();
            assert_eq!(engine.len(), 1);

            engine.update(0.5, &mut registry, &grid).unwrap();
            assert_eq!(engine.len(), 0);

            // A further update finds nothing to remove.
            engine.update(1.0, &mut registry, &grid).unwrap();
            assert_eq!(engine.len(), 0);
        }

        #[test]
        fn spawn_on_expiration_chains_a_successor() {
            let (mut registry, grid) = arena();
            let mut engine = EffectEngine::new(0, false);
            let first = engine
                .spawn(chaining_property(), Alliance::Red, Vec3::ZERO, NO_OWNER)
                .unwrap();

            engine.update(1.0, &mut registry, &grid).unwrap();

            // Predecessor gone, successor in its place at the same position
            // with a fresh clock. The freed id may be reused.
            assert_eq!(engine.len(), 1);
            assert!(engine.get(first).map_or(true, |e| e.elapsed() < 1.0));
            let successor = engine.iter().next().unwrap();
            assert_eq!(successor.position(), Vec3::ZERO);
            assert_eq!(successor.team(), Alliance::Red);
            assert!(successor.elapsed().abs() < f32::EPSILON);
        }

        #[test]
        fn successor_blocked_by_other_effect_is_dropped() {
            let (mut registry, grid) = arena();
            let mut engine = EffectEngine::new(0, true);

            let chaining = engine
                .spawn(chaining_property(), Alliance::Red, Vec3::ZERO, NO_OWNER)
                .unwrap();
            // A long-lived effect overlapping the same spot.
            let blocker = engine
                .spawn(
                    property(60.0, 1.0, 50.0),
                    Alliance::Blue,
                    Vec3::new(20.0, 0.0, 0.0),
                    NO_OWNER,
                )
                .unwrap();

            // Flip to no-overlap before the chain expires.
            engine.set_allow_overlap(false);
            engine.update(1.0, &mut registry, &grid).unwrap();

            // The chain died and its successor was rejected by the blocker.
            let remaining: Vec<EffectId> = engine.iter().map(ActiveEffect::id).collect();
            assert_eq!(remaining, vec![blocker]);
            assert!(engine.get(chaining).is_none());
        }

        #[test]
        fn administrative_remove_is_independent_of_expiry() {
            let (mut registry, grid) = arena();
            let mut engine = EffectEngine::new(0, true);
            let id = engine
                .spawn(property(60.0, 1.0, 50.0), Alliance::Neutral, Vec3::ZERO, NO_OWNER)
                .unwrap();

            assert!(engine.remove(id));
            assert!(!engine.remove(id));

            engine.update(1.0, &mut registry, &grid).unwrap();
            assert!(engine.is_empty());
        }

        #[test]
        fn clear_resets_between_rounds() {
            let mut engine = EffectEngine::new(0, true);
            let prop = property(60.0, 1.0, 50.0);
            for i in 0..3u8 {
                engine
                    .spawn(
                        Arc::clone(&prop),
                        Alliance::Neutral,
                        Vec3::new(f32::from(i) * 500.0, 0.0, 0.0),
                        NO_OWNER,
                    )
                    .unwrap();
            }

            engine.clear();
            assert!(engine.is_empty());
        }
    }
}
