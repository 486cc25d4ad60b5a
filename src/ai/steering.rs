//! Kinematic steering for the hunting agent
//!
//! Movement happens on the ground plane: height differences between the agent
//! and its target never tilt the agent or change its altitude.

use glam::{Quat, Vec3};

use crate::core::{Pose, look_rotation};

/// Below this squared planar distance a target counts as already reached
pub const ARRIVAL_EPSILON_SQ: f32 = 0.0001;

/// Output from a steering step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Displacement to apply this tick
    pub linear: Vec3,
    /// Planar direction of travel (zero when not moving)
    pub heading: Vec3,
}

impl SteeringOutput {
    /// No movement
    pub const ZERO: Self = Self {
        linear: Vec3::ZERO,
        heading: Vec3::ZERO,
    };

    /// Check whether this step moves the agent
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.heading != Vec3::ZERO
    }
}

/// Seek behavior: constant-speed travel straight at a target
#[derive(Debug, Clone)]
pub struct Seek {
    /// Target position
    pub target: Vec3,
    /// Travel speed in units per second
    pub speed: f32,
    /// Rotation smoothing rate
    pub turn_rate: f32,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec3, speed: f32, turn_rate: f32) -> Self {
        Self {
            target,
            speed,
            turn_rate,
        }
    }

    /// Displacement for one tick, ignoring height
    #[must_use]
    pub fn calculate(&self, position: Vec3, delta_time: f32) -> SteeringOutput {
        let mut to_target = self.target - position;
        to_target.y = 0.0;

        if to_target.length_squared() < ARRIVAL_EPSILON_SQ {
            return SteeringOutput::ZERO;
        }

        let distance = to_target.length();
        let heading = to_target / distance;
        // Never step past the target
        let step = (self.speed * delta_time).min(distance);
        SteeringOutput {
            linear: heading * step,
            heading,
        }
    }

    /// Move and turn `pose` for one tick, returning what was applied
    pub fn apply(&self, pose: &mut Pose, delta_time: f32) -> SteeringOutput {
        let output = self.calculate(pose.position, delta_time);
        if output.is_moving() {
            pose.translate(output.linear);
            pose.rotation = face_towards(pose.rotation, output.heading, self.turn_rate, delta_time);
        }
        output
    }
}

/// Exponentially smooth `rotation` toward facing `direction`.
///
/// The blend factor `turn_rate * delta_time` is clamped to 1, so large ticks
/// snap straight to the new heading.
#[must_use]
pub fn face_towards(rotation: Quat, direction: Vec3, turn_rate: f32, delta_time: f32) -> Quat {
    let t = (turn_rate * delta_time).clamp(0.0, 1.0);
    rotation.slerp(look_rotation(direction), t).normalize()
}
