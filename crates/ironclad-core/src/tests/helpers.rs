//! Factory functions shared by the scenario tests.

use std::sync::Arc;

use glam::Vec3;

use crate::descriptor::{EnvironmentProperty, SpawnFlags};
use crate::entity::{Alliance, Damageable, EntityId, Tank};
use crate::registry::EntityRegistry;
use gridiron::{GridConfig, NodeGrid};

/// Owner id guaranteed not to collide with any registered entity.
pub const OUTSIDE_OWNER: EntityId = EntityId::new(u32::MAX);

/// A 4 x 4 grid of 512-unit nodes over a 2048 x 2048 arena.
pub fn standard_grid() -> NodeGrid {
    let mut grid = NodeGrid::new();
    grid.configure(GridConfig {
        arena_width: 2048.0,
        arena_height: 2048.0,
        node_dimension: 512.0,
    })
    .expect("standard grid config is valid");
    grid
}

/// A flat-damage environment descriptor: no falloff, no spawn flags.
pub fn flat_effect(duration: f32, interval: f32, radius: f32, damage: u32) -> Arc<EnvironmentProperty> {
    Arc::new(EnvironmentProperty {
        id: 1,
        name: "Test Hazard".to_owned(),
        spawn: SpawnFlags::empty(),
        duration_seconds: duration,
        interval_seconds: interval,
        radius,
        decay: 1.0,
        minimum_damage: damage,
        maximum_damage: damage,
    })
}

/// Registers a tank and buckets it into the grid, the way the driver does
/// during a command drain.
pub fn deploy_tank(
    registry: &mut EntityRegistry,
    grid: &mut NodeGrid,
    callsign: &str,
    position: Vec3,
    team: Alliance,
) -> EntityId {
    let tank = Tank::new(callsign, 100).at_position(position).on_team(team);
    let id = registry
        .register(Box::new(tank))
        .expect("registry has id headroom");
    let _ = grid.process_position(id.as_u32(), position);
    id
}

/// Reads a tank's health through the contract.
pub fn health_of(registry: &EntityRegistry, id: EntityId) -> u32 {
    registry.get(id).expect("entity is registered").health()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_grid_is_four_by_four() {
        let grid = standard_grid();
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.rows(), 4);
    }

    #[test]
    fn deploy_tank_registers_and_buckets() {
        let mut registry = EntityRegistry::new();
        let mut grid = standard_grid();

        let id = deploy_tank(
            &mut registry,
            &mut grid,
            "helper",
            Vec3::new(600.0, -100.0, 0.0),
            Alliance::Red,
        );

        assert_eq!(health_of(&registry, id), 100);
        assert_eq!(grid.node_of(id.as_u32()), Some(1));
    }
}
