//! # Gridiron
//!
//! Fixed-cell spatial partitioning for locality-bounded arena queries.
//!
//! Gridiron overlays a rectangular arena with a regular grid of fixed-size
//! cells ("nodes") and tracks which occupants currently stand in which node.
//! Queries are then answered per node rather than per arena, so the cost of
//! an area query scales with local density instead of total population.
//!
//! The crate is deliberately domain-agnostic: occupants are opaque `u32`
//! ids and positions are `glam::Vec3` points. Whatever the ids mean is the
//! caller's business.
//!
//! ## Quick Start
//!
//! ```
//! use glam::Vec3;
//! use gridiron::{GridConfig, NodeGrid};
//!
//! let mut grid = NodeGrid::new();
//! grid.configure(GridConfig {
//!     arena_width: 2048.0,
//!     arena_height: 2048.0,
//!     node_dimension: 512.0,
//! })?;
//!
//! // Track an occupant.
//! grid.process_position(7, Vec3::new(600.0, -100.0, 0.0));
//!
//! // Which nodes does a blast of radius 300 touch?
//! for index in grid.nodes_overlapping(Vec3::new(512.0, -256.0, 0.0), 300.0) {
//!     for occupant in grid.occupants(index) {
//!         println!("occupant {occupant} is in range of node {index}");
//!     }
//! }
//! # Ok::<(), gridiron::GridError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod grid;
pub mod node;

// Re-exports for convenience
pub use grid::{GridConfig, NodeGrid, TILE_SIZE};
pub use node::Node;

/// Errors raised while configuring a [`NodeGrid`].
///
/// All variants belong to the "invalid configuration" class: they indicate a
/// mis-set-up grid, never a runtime condition. Position lookups against a
/// configured grid cannot fail; out-of-arena positions clamp to the nearest
/// valid node.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Arena or node dimensions were zero or negative.
    #[error("invalid grid dimensions: {width} x {height} with node dimension {node_dimension}")]
    InvalidDimensions {
        /// Requested arena width.
        width: f32,
        /// Requested arena height.
        height: f32,
        /// Requested node dimension.
        node_dimension: f32,
    },

    /// The node dimension is not a whole multiple of [`TILE_SIZE`], so node
    /// boundaries would cut through world tiles.
    #[error("node dimension {node_dimension} is not a multiple of the tile size {TILE_SIZE}")]
    MisalignedNode {
        /// Requested node dimension.
        node_dimension: f32,
    },

    /// [`NodeGrid::configure`] was called on an already-configured grid.
    #[error("grid is already configured; build a fresh grid instead of reconfiguring")]
    AlreadyConfigured,
}
