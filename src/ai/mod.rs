//! AI and navigation module
//!
//! Provides room-graph pathfinding, steering, line-of-sight checks, a generic
//! finite state machine, and the pursuit controller built from them.

mod fsm;
mod pathfinding;
mod pursuit;
mod steering;
mod vision;

pub use fsm::{State, StateMachine, Transition};
pub use pathfinding::{Path, find_path};
pub use pursuit::{PursuitController, PursuitState, SkipReason, TickInput, TickStatus};
pub use steering::{ARRIVAL_EPSILON_SQ, Seek, SteeringOutput, face_towards};
pub use vision::{OcclusionQuery, Unobstructed, VisionGate, can_observe};
