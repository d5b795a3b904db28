//! The entity registry: authoritative ownership of every damageable object.
//!
//! The registry maps [`EntityId`] to boxed [`Damageable`] handles. Storage is
//! a `BTreeMap` so iteration is always in ascending-id order, which keeps
//! every downstream pass (re-bucketing, effect damage, snapshots)
//! deterministic.
//!
//! # Id allocation
//!
//! `register` assigns the smallest id not currently in use, searching the
//! window `[0, len() + margin)`. Ids freed by `remove` are reused by later
//! registrations. With a positive margin the window always contains a free
//! id; the exhaustion branch still exists as an explicit
//! [`SimError::CapacityExhausted`] rather than an unreachable-code
//! assumption.

use std::collections::BTreeMap;
use std::fmt;

use tracing::info;

use crate::entity::{Damageable, EntityId, EntityState};
use crate::error::{IdNamespace, SimError};

/// Slack added to the live-entity count when sizing the id-allocation search
/// window.
pub const ID_MARGIN: u32 = 20;

/// Owns every registered damageable entity and its id.
///
/// All mutation happens on the tick thread; cross-thread consumers read
/// [`EntityRegistry::snapshot`] copies instead of holding references across
/// tick boundaries.
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Box<dyn Damageable>>,
    margin: u32,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entities", &format!("[{} entities]", self.entities.len()))
            .field("margin", &self.margin)
            .finish()
    }
}

impl EntityRegistry {
    /// Creates an empty registry with the default id margin.
    #[must_use]
    pub fn new() -> Self {
        Self::with_margin(ID_MARGIN)
    }

    /// Creates an empty registry with an explicit id margin. A margin of
    /// zero makes every registration fail; useful only for exercising the
    /// capacity path.
    #[must_use]
    pub fn with_margin(margin: u32) -> Self {
        Self {
            entities: BTreeMap::new(),
            margin,
        }
    }

    /// Registers an entity: assigns the smallest unused id in
    /// `[0, len() + margin)`, stamps it onto the entity, and stores the
    /// handle.
    ///
    /// # Errors
    ///
    /// [`SimError::CapacityExhausted`] if no id in the window is free. The
    /// registry is left untouched in that case.
    pub fn register(&mut self, mut entity: Box<dyn Damageable>) -> Result<EntityId, SimError> {
        let live = u32::try_from(self.entities.len()).unwrap_or(u32::MAX);
        let window = live.saturating_add(self.margin);

        let id = (0..window)
            .map(EntityId::new)
            .find(|candidate| !self.entities.contains_key(candidate))
            .ok_or(SimError::CapacityExhausted {
                namespace: IdNamespace::Entity,
            })?;

        entity.assign_id(id);
        self.entities.insert(id, entity);
        info!(entity = %id, "entity registered");

        Ok(id)
    }

    /// Returns a shared handle to an entity, or `None` on a miss.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&dyn Damageable> {
        self.entities.get(&id).map(Box::as_ref)
    }

    /// Returns a mutable handle to an entity so callers can adjust health or
    /// position in place, or `None` on a miss.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut (dyn Damageable + 'static)> {
        self.entities.get_mut(&id).map(Box::as_mut)
    }

    /// Returns `true` if an entity with this id is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Removes an entity by id, freeing the id for reuse. Returns whether a
    /// removal occurred. This is the primary removal path.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let removed = self.entities.remove(&id).is_some();
        if removed {
            info!(entity = %id, "entity removed");
        }
        removed
    }

    /// Removes the first entity matching a predicate.
    ///
    /// O(n) scan in id order; intended for rare administrative removal when
    /// the caller does not know the id. Not a hot-path operation;
    /// [`EntityRegistry::remove`] is.
    pub fn remove_matching<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(&dyn Damageable) -> bool,
    {
        let found = self
            .entities
            .iter()
            .find(|(_, entity)| predicate(entity.as_ref()))
            .map(|(id, _)| *id);

        match found {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    /// Iterates entities in ascending-id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &dyn Damageable)> + '_ {
        self.entities.iter().map(|(id, entity)| (*id, entity.as_ref()))
    }

    /// Iterates entities mutably in ascending-id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut (dyn Damageable + 'static))> + '_ {
        self.entities
            .iter_mut()
            .map(|(id, entity)| (*id, entity.as_mut()))
    }

    /// Iterates registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Produces an internally consistent copy-of-fields view of every
    /// registered entity: no entity appears twice, none is omitted.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EntityState> {
        self.entities.values().map(|entity| entity.state()).collect()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Removes every entity. Ids all become reusable.
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
