//! Agent pose: position and facing

use glam::{Quat, Vec3};

/// Position and rotation of an agent in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
}

impl Pose {
    /// Create a pose at the origin facing `-Z`
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pose with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a pose with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Translate by a delta
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Yaw-only rotation whose forward axis points along `direction`.
///
/// The vertical component of `direction` is ignored. Returns identity for a
/// zero-length planar direction.
#[must_use]
pub fn look_rotation(direction: Vec3) -> Quat {
    let planar = Vec3::new(direction.x, 0.0, direction.z);
    if planar.length_squared() < f32::EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_y((-planar.x).atan2(-planar.z))
}
