//! Level module
//!
//! Room graph, seeded layout generation, and the box geometry handed to
//! world builders

mod generator;
mod geometry;
mod graph;

pub use generator::{Level, LevelGenerator};
pub use geometry::{BoxVolume, FLOOR_THICKNESS, LevelGeometry, WALL_HEIGHT, WALL_THICKNESS, WorldBuilder};
pub use graph::{GraphError, GridPos, ROOM_HEIGHT, RoomGraph, RoomKind, RoomNode};
