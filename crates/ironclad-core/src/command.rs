//! Inbound commands from the networking/session layer.
//!
//! Network threads never touch simulation state directly. They enqueue
//! [`Command`]s onto a thread-safe channel;
//! [`Simulation::tick`](crate::simulation::Simulation::tick) drains the
//! queue at the start of each tick, giving the tick a single-writer view of
//! state for its whole duration. No lock is held anywhere inside the
//! simulation.

use crossbeam_channel::{Receiver, Sender};
use glam::Vec3;
use std::fmt;

use crate::entity::{Alliance, Damageable, EntityId};

/// A state mutation requested from outside the tick thread.
pub enum Command {
    /// Register a new entity built by session logic. The registry assigns
    /// and stamps its id during the drain.
    Join(Box<dyn Damageable>),

    /// Remove an entity (disconnect, kick). Unknown ids are recovered
    /// locally.
    Leave(EntityId),

    /// Update an entity's position from a (sanitized) client report.
    Move {
        /// The entity to move.
        id: EntityId,
        /// New world position.
        position: Vec3,
    },

    /// Spawn an environment effect from a loaded descriptor (weapon impact
    /// resolved by the projectile layer).
    SpawnEffect {
        /// Environment-property descriptor id to spawn from.
        environment: u32,
        /// Team on whose behalf the effect deals damage.
        team: Alliance,
        /// Center of the area of effect.
        position: Vec3,
        /// The entity that caused the effect.
        owner: EntityId,
    },
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Join(entity) => f.debug_tuple("Join").field(&entity.id()).finish(),
            Self::Leave(id) => f.debug_tuple("Leave").field(id).finish(),
            Self::Move { id, position } => f
                .debug_struct("Move")
                .field("id", id)
                .field("position", position)
                .finish(),
            Self::SpawnEffect {
                environment,
                team,
                position,
                owner,
            } => f
                .debug_struct("SpawnEffect")
                .field("environment", environment)
                .field("team", team)
                .field("position", position)
                .field("owner", owner)
                .finish(),
        }
    }
}

/// Builds the command channel: a clonable producer half for network threads
/// and the consumer half owned by the simulation.
///
/// The channel is unbounded; backpressure belongs to the RPC layer feeding
/// it, which is the only place timeouts apply.
#[must_use]
pub fn command_channel() -> (Sender<Command>, Receiver<Command>) {
    crossbeam_channel::unbounded()
}
