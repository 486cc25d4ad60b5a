//! Core module
//!
//! Configuration, poses, events and debug inspection shared by the rest of
//! the crate

mod config;
mod debug;
mod events;
mod transform;

pub use config::{ConfigError, GameConfig, GenerationConfig, PursuitConfig, SeedMode, VisionConfig};
pub use debug::DebugSnapshot;
pub use events::{EventQueue, GameEvent};
pub use transform::{Pose, look_rotation};
