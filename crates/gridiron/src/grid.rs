//! The arena grid: cell addressing, membership tracking, and area queries.
//!
//! # Addressing
//!
//! The arena is covered by `columns x rows` square cells of side
//! [`GridConfig::node_dimension`]. World +y points north and rows grow
//! southward, so a position maps to
//! `column = floor(x / dim)`, `row = floor(-y / dim)`, and the node index is
//! `row * columns + column`. Both coordinates clamp into the valid range, so
//! a momentarily out-of-arena position lands in the nearest edge node rather
//! than producing an out-of-range lookup.
//!
//! The grid partitions the ground plane; the `z` component of positions is
//! ignored.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::node::Node;
use crate::GridError;

/// Side length of one world tile. Node dimensions must be a whole multiple
/// of this so cell boundaries coincide with tile boundaries.
pub const TILE_SIZE: f32 = 64.0;

/// Dimensions handed to [`NodeGrid::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Arena width in world units.
    pub arena_width: f32,
    /// Arena height in world units.
    pub arena_height: f32,
    /// Side length of one square node, a multiple of [`TILE_SIZE`].
    pub node_dimension: f32,
}

/// Resolved grid layout, fixed at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Layout {
    columns: u32,
    rows: u32,
    node_dimension: f32,
}

impl Layout {
    /// Maps a world position to a clamped `(row, column)` cell address.
    ///
    /// The casts are safe: both values are clamped into `[0, u32-sized
    /// grid dimension)` before conversion, and a NaN coordinate saturates
    /// to cell 0.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[allow(clippy::cast_precision_loss)]
    fn cell_of(&self, position: Vec3) -> (u32, u32) {
        let max_col = (self.columns - 1) as f32;
        let max_row = (self.rows - 1) as f32;

        let column = (position.x / self.node_dimension).floor().clamp(0.0, max_col);
        let row = (-position.y / self.node_dimension).floor().clamp(0.0, max_row);

        (row as u32, column as u32)
    }

    const fn index_of(&self, row: u32, column: u32) -> u32 {
        row * self.columns + column
    }

    const fn node_count(&self) -> u32 {
        self.columns * self.rows
    }
}

/// Partitions the arena into fixed-size nodes and tracks which occupant
/// stands in which node.
///
/// A grid starts unconfigured and must be configured exactly once before
/// use; queries against an unconfigured grid return empty results. After
/// configuration the invariants hold:
///
/// - every occupant processed through [`NodeGrid::process_position`] belongs
///   to exactly one node;
/// - membership is recomputed from the occupant's position, never patched
///   incrementally;
/// - node indices returned by any query are always in range.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use gridiron::{GridConfig, NodeGrid};
///
/// let mut grid = NodeGrid::new();
/// grid.configure(GridConfig {
///     arena_width: 1024.0,
///     arena_height: 1024.0,
///     node_dimension: 256.0,
/// })?;
///
/// let node = grid.process_position(1, Vec3::new(300.0, -10.0, 0.0)).unwrap();
/// assert!(grid.occupants(node).contains(&1));
/// # Ok::<(), gridiron::GridError>(())
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NodeGrid {
    layout: Option<Layout>,
    nodes: Vec<Node>,
    /// Occupant id -> current node index.
    assignments: BTreeMap<u32, u32>,
}

impl NodeGrid {
    /// Creates an unconfigured grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Establishes the grid layout. Callable exactly once.
    ///
    /// The node count is `ceil(width / dim) * ceil(height / dim)`.
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidDimensions`] if any dimension is not positive.
    /// - [`GridError::MisalignedNode`] if `node_dimension` is not a whole
    ///   multiple of [`TILE_SIZE`].
    /// - [`GridError::AlreadyConfigured`] on a second call; prior node
    ///   assignments are never silently invalidated.
    pub fn configure(&mut self, config: GridConfig) -> Result<(), GridError> {
        if self.layout.is_some() {
            return Err(GridError::AlreadyConfigured);
        }
        if config.arena_width <= 0.0 || config.arena_height <= 0.0 || config.node_dimension <= 0.0
        {
            return Err(GridError::InvalidDimensions {
                width: config.arena_width,
                height: config.arena_height,
                node_dimension: config.node_dimension,
            });
        }
        if (config.node_dimension % TILE_SIZE).abs() > f32::EPSILON {
            return Err(GridError::MisalignedNode {
                node_dimension: config.node_dimension,
            });
        }

        // Dimensions are validated positive above, so ceil() is >= 1.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let layout = Layout {
            columns: (config.arena_width / config.node_dimension).ceil() as u32,
            rows: (config.arena_height / config.node_dimension).ceil() as u32,
            node_dimension: config.node_dimension,
        };

        self.nodes = (0..layout.node_count()).map(Node::new).collect();
        self.layout = Some(layout);

        Ok(())
    }

    /// Returns `true` once [`NodeGrid::configure`] has succeeded.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.layout.is_some()
    }

    /// Returns the total number of nodes, or 0 if unconfigured.
    #[must_use]
    pub fn node_count(&self) -> u32 {
        self.layout.map_or(0, |l| l.node_count())
    }

    /// Returns the number of columns, or 0 if unconfigured.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.layout.map_or(0, |l| l.columns)
    }

    /// Returns the number of rows, or 0 if unconfigured.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.layout.map_or(0, |l| l.rows)
    }

    /// Returns the node index a position maps to, or `None` if the grid is
    /// unconfigured. Out-of-arena positions clamp to the nearest edge node.
    #[must_use]
    pub fn node_at(&self, position: Vec3) -> Option<u32> {
        let layout = self.layout?;
        let (row, column) = layout.cell_of(position);
        Some(layout.index_of(row, column))
    }

    /// Re-buckets an occupant from its current position.
    ///
    /// This is the only membership mutation path: the occupant's node index
    /// is recomputed from scratch, it is unregistered from its prior node if
    /// the index changed, and registered in the new one. Returns the node
    /// index the occupant now belongs to, or `None` if the grid is
    /// unconfigured.
    pub fn process_position(&mut self, occupant: u32, position: Vec3) -> Option<u32> {
        let layout = self.layout?;
        let (row, column) = layout.cell_of(position);
        let index = layout.index_of(row, column);

        match self.assignments.insert(occupant, index) {
            Some(previous) if previous == index => {}
            Some(previous) => {
                trace!(occupant, from = previous, to = index, "node transition");
                self.nodes[previous as usize].unregister(occupant);
                self.nodes[index as usize].register(occupant);
            }
            None => {
                self.nodes[index as usize].register(occupant);
            }
        }

        Some(index)
    }

    /// Returns the node index an occupant is currently assigned to, if any.
    #[must_use]
    pub fn node_of(&self, occupant: u32) -> Option<u32> {
        self.assignments.get(&occupant).copied()
    }

    /// Removes an occupant from the grid entirely. Returns whether it was
    /// tracked.
    pub fn remove(&mut self, occupant: u32) -> bool {
        match self.assignments.remove(&occupant) {
            Some(index) => {
                self.nodes[index as usize].unregister(occupant);
                true
            }
            None => false,
        }
    }

    /// Returns every node index whose cell rectangle intersects the given
    /// circle. Indices come back in ascending (row-major) order.
    ///
    /// The query works on the ground plane; the circle's `z` is ignored.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[allow(clippy::cast_precision_loss)]
    pub fn nodes_overlapping(&self, center: Vec3, radius: f32) -> Vec<u32> {
        let Some(layout) = self.layout else {
            return Vec::new();
        };

        let dim = layout.node_dimension;
        let max_col = (layout.columns - 1) as f32;
        let max_row = (layout.rows - 1) as f32;

        // Grid space: x unchanged, y flipped so rows grow with the index.
        let gx = center.x;
        let gy = -center.y;

        let col_min = ((gx - radius) / dim).floor().clamp(0.0, max_col) as u32;
        let col_max = ((gx + radius) / dim).floor().clamp(0.0, max_col) as u32;
        let row_min = ((gy - radius) / dim).floor().clamp(0.0, max_row) as u32;
        let row_max = ((gy + radius) / dim).floor().clamp(0.0, max_row) as u32;

        let radius_sq = radius * radius;
        let mut indices = Vec::new();
        for row in row_min..=row_max {
            for column in col_min..=col_max {
                // Closest point of the cell rectangle to the circle center.
                let cell_x = column as f32 * dim;
                let cell_y = row as f32 * dim;
                let dx = gx - gx.clamp(cell_x, cell_x + dim);
                let dy = gy - gy.clamp(cell_y, cell_y + dim);
                if dx * dx + dy * dy <= radius_sq {
                    indices.push(layout.index_of(row, column));
                }
            }
        }

        indices
    }

    /// Returns the occupant ids currently in the given node, in ascending
    /// order. Unknown indices and unconfigured grids yield an empty list.
    #[must_use]
    pub fn occupants(&self, index: u32) -> Vec<u32> {
        self.nodes
            .get(index as usize)
            .map(|node| node.iter().collect())
            .unwrap_or_default()
    }

    /// Returns the number of occupants currently tracked across all nodes.
    #[must_use]
    pub fn occupant_count(&self) -> usize {
        self.assignments.len()
    }

    /// Drops every occupant from every node, keeping the layout.
    pub fn clear(&mut self) {
        self.assignments.clear();
        for node in &mut self.nodes {
            node.clear();
        }
    }
}
