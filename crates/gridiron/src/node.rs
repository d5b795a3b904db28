//! A single grid cell and its occupant bookkeeping.
//!
//! Nodes are owned and mutated by [`NodeGrid`](crate::NodeGrid); external
//! code only reads them. Membership changes flow exclusively through
//! [`NodeGrid::process_position`](crate::NodeGrid::process_position) so that
//! an occupant can never appear in two nodes at once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One fixed-size rectangular cell in the arena grid.
///
/// A node knows its own row-major index and the ordered set of occupant ids
/// currently positioned inside it. The ordered set gives deterministic
/// iteration, which keeps downstream damage application reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    index: u32,
    occupants: BTreeSet<u32>,
}

impl Node {
    /// Creates an empty node with the given row-major index.
    #[must_use]
    pub(crate) fn new(index: u32) -> Self {
        Self {
            index,
            occupants: BTreeSet::new(),
        }
    }

    /// Returns this node's row-major index in the grid.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Adds an occupant to this node.
    pub(crate) fn register(&mut self, occupant: u32) {
        self.occupants.insert(occupant);
    }

    /// Removes an occupant from this node. Removing an absent occupant is a
    /// no-op.
    pub(crate) fn unregister(&mut self, occupant: u32) {
        self.occupants.remove(&occupant);
    }

    /// Drops every occupant from this node.
    pub(crate) fn clear(&mut self) {
        self.occupants.clear();
    }

    /// Returns `true` if the given occupant is currently in this node.
    #[must_use]
    pub fn contains(&self, occupant: u32) -> bool {
        self.occupants.contains(&occupant)
    }

    /// Returns the number of occupants in this node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Returns `true` if no occupant is in this node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Iterates over the occupant ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.occupants.iter().copied()
    }
}
