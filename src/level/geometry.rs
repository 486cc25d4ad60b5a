//! Box layout for the world-building collaborator
//!
//! Every room gets a floor slab, and every side without a connected neighbour
//! gets a wall. Renderers and collision worlds consume the same layout.

use glam::Vec3;

use crate::level::graph::{GridPos, RoomGraph};

/// Wall height in world units
pub const WALL_HEIGHT: f32 = 3.0;
/// Wall thickness in world units
pub const WALL_THICKNESS: f32 = 0.5;
/// Floor slab thickness in world units
pub const FLOOR_THICKNESS: f32 = 1.0;

/// An axis-aligned box belonging to a room
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxVolume {
    /// Room this box belongs to
    pub room: GridPos,
    /// Centre in world space
    pub center: Vec3,
    /// Half of the box size along each axis
    pub half_extents: Vec3,
}

/// Floors and walls for a whole level
#[derive(Debug, Clone, Default)]
pub struct LevelGeometry {
    pub floors: Vec<BoxVolume>,
    pub walls: Vec<BoxVolume>,
}

impl LevelGeometry {
    /// Lay out floors and walls for `graph`
    #[must_use]
    pub fn from_graph(graph: &RoomGraph) -> Self {
        let cell = graph.cell_size();
        let half = cell * 0.5;
        let mut geometry = Self::default();

        for room in graph.rooms() {
            let pos = room.pos();
            let center = graph.grid_to_world(pos);

            // Top face flush with the room height so agents stand on it.
            geometry.floors.push(BoxVolume {
                room: pos,
                center: center - Vec3::Y * (FLOOR_THICKNESS * 0.5),
                half_extents: Vec3::new(half, FLOOR_THICKNESS * 0.5, half),
            });

            let sides = [
                (GridPos::NORTH, Vec3::new(0.0, 0.0, half), Vec3::new(cell, WALL_HEIGHT, WALL_THICKNESS)),
                (GridPos::SOUTH, Vec3::new(0.0, 0.0, -half), Vec3::new(cell, WALL_HEIGHT, WALL_THICKNESS)),
                (GridPos::EAST, Vec3::new(half, 0.0, 0.0), Vec3::new(WALL_THICKNESS, WALL_HEIGHT, cell)),
                (GridPos::WEST, Vec3::new(-half, 0.0, 0.0), Vec3::new(WALL_THICKNESS, WALL_HEIGHT, cell)),
            ];

            for (dir, offset, size) in sides {
                if room.is_neighbor(pos + dir) {
                    continue;
                }
                geometry.walls.push(BoxVolume {
                    room: pos,
                    center: center + offset + Vec3::Y * (WALL_HEIGHT * 0.5),
                    half_extents: size * 0.5,
                });
            }
        }

        geometry
    }

    /// Total number of boxes
    #[must_use]
    pub fn len(&self) -> usize {
        self.floors.len() + self.walls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.floors.is_empty() && self.walls.is_empty()
    }
}

/// Consumer of a finished level (scene instantiation, collision, ...).
///
/// Called once after each generation; the builder never reports back into the
/// core.
pub trait WorldBuilder {
    /// Replace whatever the previous level built with `geometry`
    fn build_level(&mut self, graph: &RoomGraph, geometry: &LevelGeometry);
}
