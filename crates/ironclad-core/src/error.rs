//! Error taxonomy for the simulation core.
//!
//! Lookup misses are not errors here: every id lookup in the crate returns an
//! `Option` or a `bool` and is recovered at the call site. The variants below
//! cover the conditions that must reach the driver:
//!
//! - [`SimError::CapacityExhausted`] is fatal by configuration: it means the
//!   id margin is far too small or removals are leaking, and silently skipping
//!   it would desynchronize ids from reality.
//! - [`SimError::OverlapConflict`] is an expected, recoverable outcome of
//!   [`spawn`](crate::effect::EffectEngine::spawn) under the no-overlap
//!   policy. It is signaled to the caller, never logged as an error.
//! - [`SimError::UnknownDescriptor`] is recovered where it arises (a spawn
//!   command naming a descriptor the arsenal does not carry is dropped).
//! - [`SimError::InvalidConfiguration`] wraps grid set-up failures.

use std::fmt;

use crate::effect::EffectId;

/// The two independent id spaces managed by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdNamespace {
    /// Registry-managed damageable entities.
    Entity,
    /// Engine-managed environment effects.
    Effect,
}

impl fmt::Display for IdNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => write!(f, "entity"),
            Self::Effect => write!(f, "effect"),
        }
    }
}

/// Errors surfaced by the simulation core.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SimError {
    /// No free id exists within the allocation margin window.
    #[error("{namespace} id space exhausted within the margin window")]
    CapacityExhausted {
        /// Which id space ran out.
        namespace: IdNamespace,
    },

    /// A new effect's area intersects an active effect while the engine
    /// disallows overlap.
    #[error("effect area overlaps active effect {blocking}")]
    OverlapConflict {
        /// The already-active effect occupying the area.
        blocking: EffectId,
    },

    /// A command referenced a descriptor id the arsenal does not carry.
    #[error("unknown descriptor id {id}")]
    UnknownDescriptor {
        /// The missing descriptor id.
        id: u32,
    },

    /// The spatial grid was configured with invalid dimensions, or twice.
    #[error("invalid grid configuration: {0}")]
    InvalidConfiguration(#[from] gridiron::GridError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_display() {
        assert_eq!(IdNamespace::Entity.to_string(), "entity");
        assert_eq!(IdNamespace::Effect.to_string(), "effect");
    }

    #[test]
    fn capacity_message_names_namespace() {
        let err = SimError::CapacityExhausted {
            namespace: IdNamespace::Effect,
        };
        assert!(err.to_string().contains("effect id space"));
    }

    #[test]
    fn grid_error_converts() {
        let err: SimError = gridiron::GridError::AlreadyConfigured.into();
        assert!(matches!(err, SimError::InvalidConfiguration(_)));
    }
}
