//! The per-tick simulation driver.
//!
//! [`Simulation`] owns every piece of mutable match state (the entity
//! registry, the spatial grid, the effect engine, and the descriptor
//! arsenal) and advances it with [`Simulation::tick`]:
//!
//! 1. **DRAIN**: pull every queued [`Command`] off the inbound channel and
//!    apply it. Nothing else ever mutates state, so the rest of the tick
//!    holds a single-writer view.
//! 2. **RE-BUCKET**: recompute every entity's node assignment from its
//!    current position.
//! 3. **EFFECTS**: advance the effect engine, applying interval damage.
//! 4. **SWEEP**: remove dead entities from the registry and the grid.
//!
//! The driver constructs exactly one `Simulation` per match and holds it
//! directly; there is no process-wide instance.

use crossbeam_channel::{Receiver, Sender};
use std::fmt;

use gridiron::{GridConfig, NodeGrid};
use tracing::{debug, info};

use crate::command::{command_channel, Command};
use crate::descriptor::Arsenal;
use crate::effect::EffectEngine;
use crate::entity::{EntityId, EntityState};
use crate::error::SimError;
use crate::registry::EntityRegistry;

// =============================================================================
// Configuration
// =============================================================================

/// Match-level configuration for a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Arena width in world units.
    pub arena_width: f32,
    /// Arena height in world units.
    pub arena_height: f32,
    /// Node side length, a multiple of [`gridiron::TILE_SIZE`].
    pub node_dimension: f32,
    /// Engine-wide effect overlap policy.
    pub allow_overlap: bool,
    /// Seed for the deterministic damage-roll sequence.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arena_width: 2048.0,
            arena_height: 2048.0,
            node_dimension: 512.0,
            allow_overlap: false,
            seed: 0,
        }
    }
}

/// What one tick did, for the driver's bookkeeping and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that just completed (first tick is 1).
    pub tick: u64,
    /// Entities registered after the sweep.
    pub entities: usize,
    /// Effects active after expiry processing.
    pub active_effects: usize,
    /// Entities swept out this tick because their health reached zero.
    pub removed: Vec<EntityId>,
}

// =============================================================================
// Simulation
// =============================================================================

/// Owns and advances all simulation state for one match.
///
/// Constructed by the external driver, which calls [`Simulation::tick`] at a
/// fixed interval. Cross-thread input arrives only through the command
/// sender returned by [`Simulation::new`]; cross-thread reads use
/// [`Simulation::snapshot`] copies, never references into the registry.
pub struct Simulation {
    registry: EntityRegistry,
    grid: NodeGrid,
    effects: EffectEngine,
    arsenal: Arsenal,
    commands: Receiver<Command>,
    tick: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("registry", &self.registry)
            .field("effects", &self.effects)
            .field("tick", &self.tick)
            .finish()
    }
}

impl Simulation {
    /// Builds a simulation and the command sender that feeds it.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfiguration`] if the grid dimensions are
    /// invalid.
    pub fn new(config: SimulationConfig) -> Result<(Self, Sender<Command>), SimError> {
        let mut grid = NodeGrid::new();
        grid.configure(GridConfig {
            arena_width: config.arena_width,
            arena_height: config.arena_height,
            node_dimension: config.node_dimension,
        })?;

        let (sender, receiver) = command_channel();
        let simulation = Self {
            registry: EntityRegistry::new(),
            grid,
            effects: EffectEngine::new(config.seed, config.allow_overlap),
            arsenal: Arsenal::new(),
            commands: receiver,
            tick: 0,
        };

        Ok((simulation, sender))
    }

    /// Advances the simulation by one fixed interval of `dt` seconds.
    ///
    /// # Errors
    ///
    /// [`SimError::CapacityExhausted`] if an id space ran out while applying
    /// a command or spawning a successor effect. The offending operation is
    /// abandoned; state already mutated this tick stands, and undrained
    /// commands stay queued for the next tick.
    pub fn tick(&mut self, dt: f32) -> Result<TickSummary, SimError> {
        // DRAIN: the queue is the only cross-thread mutation path.
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command)?;
        }

        // RE-BUCKET: node membership is recomputed, never patched.
        for (id, entity) in self.registry.iter() {
            let _ = self.grid.process_position(id.as_u32(), entity.position());
        }

        // EFFECTS: interval damage and expiry.
        self.effects.update(dt, &mut self.registry, &self.grid)?;

        // SWEEP: dead entities leave the registry and the grid.
        let dead: Vec<EntityId> = self
            .registry
            .iter()
            .filter(|(_, entity)| !entity.is_alive())
            .map(|(id, _)| id)
            .collect();
        for id in &dead {
            self.registry.remove(*id);
            self.grid.remove(id.as_u32());
        }

        self.tick += 1;
        Ok(TickSummary {
            tick: self.tick,
            entities: self.registry.len(),
            active_effects: self.effects.len(),
            removed: dead,
        })
    }

    /// Applies one drained command.
    fn apply(&mut self, command: Command) -> Result<(), SimError> {
        match command {
            Command::Join(entity) => {
                let position = entity.position();
                let id = self.registry.register(entity)?;
                let _ = self.grid.process_position(id.as_u32(), position);
            }
            Command::Leave(id) => {
                if self.registry.remove(id) {
                    self.grid.remove(id.as_u32());
                } else {
                    debug!(entity = %id, "leave for unknown entity dropped");
                }
            }
            Command::Move { id, position } => match self.registry.get_mut(id) {
                Some(entity) => {
                    entity.set_position(position);
                    let _ = self.grid.process_position(id.as_u32(), position);
                }
                None => debug!(entity = %id, "move for unknown entity dropped"),
            },
            Command::SpawnEffect {
                environment,
                team,
                position,
                owner,
            } => {
                let property = match self.arsenal.require_environment(environment) {
                    Ok(property) => property,
                    Err(err) => {
                        debug!(descriptor = environment, %err, "spawn command dropped");
                        return Ok(());
                    }
                };
                match self.effects.spawn(property, team, position, owner) {
                    Ok(id) => info!(effect = %id, owner = %owner, "effect spawned by command"),
                    Err(SimError::OverlapConflict { blocking }) => {
                        debug!(%blocking, "effect spawn rejected by overlap policy");
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(())
    }

    /// Copy-of-fields view of every registered entity, safe to ship to
    /// other threads.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EntityState> {
        self.registry.snapshot()
    }

    /// Tick counter: how many times [`Simulation::tick`] has completed.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Read access to the entity registry.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Mutable access to the registry, for match setup and game-mode rules
    /// running on the tick thread. Mid-match mutation from other threads
    /// must go through commands instead.
    #[must_use]
    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// Read access to the spatial grid.
    #[must_use]
    pub fn grid(&self) -> &NodeGrid {
        &self.grid
    }

    /// Read access to the effect engine.
    #[must_use]
    pub fn effects(&self) -> &EffectEngine {
        &self.effects
    }

    /// Mutable access to the effect engine, for administrative removal and
    /// between-round resets on the tick thread.
    #[must_use]
    pub fn effects_mut(&mut self) -> &mut EffectEngine {
        &mut self.effects
    }

    /// Mutable access to the descriptor arsenal, populated at match setup
    /// by the configuration layer.
    #[must_use]
    pub fn arsenal_mut(&mut self) -> &mut Arsenal {
        &mut self.arsenal
    }
}

// =============================================================================
// Tests
// =============================================================================
