//! Line-of-sight gate: range, field of view, then occlusion

use glam::Vec3;

use crate::core::{Pose, VisionConfig};

/// Answers whether blocking geometry lies between two points.
///
/// Implementations must ignore the target's own body and be deterministic for
/// a static scene.
pub trait OcclusionQuery {
    /// `true` if something blocks the segment from `origin` to `target`
    fn is_blocked(&self, origin: Vec3, target: Vec3) -> bool;
}

impl<F> OcclusionQuery for F
where
    F: Fn(Vec3, Vec3) -> bool,
{
    fn is_blocked(&self, origin: Vec3, target: Vec3) -> bool {
        self(origin, target)
    }
}

/// Open space: nothing ever blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct Unobstructed;

impl OcclusionQuery for Unobstructed {
    fn is_blocked(&self, _origin: Vec3, _target: Vec3) -> bool {
        false
    }
}

/// Range and field-of-view test, with occlusion delegated to `occlusion`.
///
/// The occlusion query only runs if both cheaper gates pass.
#[must_use]
pub fn can_observe(
    origin: &Pose,
    target: Vec3,
    max_range: f32,
    half_fov_degrees: f32,
    occlusion: &dyn OcclusionQuery,
) -> bool {
    let to_target = target - origin.position;
    let distance = to_target.length();
    if distance > max_range {
        return false;
    }

    // A target at the eye has no direction to measure.
    if distance > f32::EPSILON {
        let angle = origin.forward().angle_between(to_target).to_degrees();
        if angle > half_fov_degrees {
            return false;
        }
    }

    !occlusion.is_blocked(origin.position, target)
}

/// Sight of a single observer, configured once
#[derive(Debug, Clone, Default)]
pub struct VisionGate {
    config: VisionConfig,
}

impl VisionGate {
    #[must_use]
    pub fn new(config: VisionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Where the observer looks from: lifted by the eye height and pushed out
    /// along the facing direction so rays start clear of its own body.
    #[must_use]
    pub fn eye(&self, body: &Pose) -> Pose {
        Pose::from_position_rotation(
            body.position + Vec3::Y * self.config.eye_height + body.forward() * self.config.eye_forward,
            body.rotation,
        )
    }

    /// Check whether an observer standing at `body` sees `target`
    #[must_use]
    pub fn can_see(&self, body: &Pose, target: Vec3, occlusion: &dyn OcclusionQuery) -> bool {
        can_observe(
            &self.eye(body),
            target,
            self.config.view_distance,
            self.config.half_fov_degrees(),
            occlusion,
        )
    }
}
