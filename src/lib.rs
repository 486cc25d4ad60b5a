//! Pursuit-horror core built in Rust
//!
//! This crate provides:
//! - Seeded procedural room-graph levels
//! - A* pathfinding over the room graph
//! - Line-of-sight checks (range, field of view, occlusion)
//! - A Patrol / Chase / Search pursuit controller
//! - Level collision with rapier3d for occlusion ray casts

pub mod ai;
pub mod core;
pub mod level;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        OcclusionQuery, PursuitController, PursuitState, Seek, TickInput, TickStatus, VisionGate,
    };
    pub use crate::core::{ConfigError, DebugSnapshot, EventQueue, GameConfig, GameEvent, Pose};
    pub use crate::level::{
        GridPos, Level, LevelGenerator, LevelGeometry, RoomGraph, RoomKind, WorldBuilder,
    };
    pub use crate::physics::{ColliderHandle, Physics};
    pub use glam::{Quat, Vec3};
}
