//! Static level collision using rapier3d
//!
//! Level boxes are parentless colliders: nothing here is ever simulated, the
//! world only answers ray queries for line of sight.

use glam::Vec3;
use rapier3d::prelude::*;

use crate::ai::OcclusionQuery;
use crate::level::{BoxVolume, LevelGeometry, RoomGraph, WorldBuilder};

/// Hits closer than this to the target count as reaching it
const CONTACT_EPSILON: f32 = 1e-3;

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

/// Collision world for one level plus an optional target body
pub struct Physics {
    /// Rigid body set (empty; colliders have no parent)
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Island manager, needed to remove colliders
    island_manager: IslandManager,
    /// Query pipeline for raycasting
    query_pipeline: QueryPipeline,
    /// Colliders owned by the current level
    level_colliders: Vec<ColliderHandle>,
    /// Body that line-of-sight rays look for
    target: Option<ColliderHandle>,
}

impl Physics {
    /// Create an empty collision world
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            level_colliders: Vec::new(),
            target: None,
        }
    }

    /// Add a fixed box collider
    pub fn add_static_box(&mut self, volume: &BoxVolume) -> ColliderHandle {
        let half = volume.half_extents;
        let center = volume.center;
        let collider = ColliderBuilder::cuboid(half.x, half.y, half.z)
            .translation(vector![center.x, center.y, center.z])
            .build();

        ColliderHandle(self.collider_set.insert(collider))
    }

    /// Add (or replace) the target body as an upright capsule
    pub fn add_target_capsule(&mut self, position: Vec3, half_height: f32, radius: f32) -> ColliderHandle {
        if let Some(old) = self.target.take() {
            self.remove_collider(old);
        }

        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .translation(vector![position.x, position.y, position.z])
            .build();
        let handle = ColliderHandle(self.collider_set.insert(collider));

        self.target = Some(handle);
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    /// Move the target body
    pub fn set_target_position(&mut self, position: Vec3) {
        let Some(handle) = self.target else {
            return;
        };
        if let Some(collider) = self.collider_set.get_mut(handle.0) {
            collider.set_translation(vector![position.x, position.y, position.z]);
            self.query_pipeline.update(&self.collider_set);
        }
    }

    /// Get the target collider, if any
    #[must_use]
    pub fn target(&self) -> Option<ColliderHandle> {
        self.target
    }

    /// Number of colliders belonging to the level
    #[must_use]
    pub fn level_collider_count(&self) -> usize {
        self.level_colliders.len()
    }

    /// Remove every level collider, keeping the target
    pub fn clear_level(&mut self) {
        for handle in std::mem::take(&mut self.level_colliders) {
            self.remove_collider(handle);
        }
        self.query_pipeline.update(&self.collider_set);
    }

    fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle.0,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            false,
        );
    }

    /// Cast a ray and return the first hit, skipping `ignore`
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: Option<ColliderHandle>,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let mut filter = QueryFilter::default();
        if let Some(handle) = ignore {
            filter = filter.exclude_collider(handle.0);
        }

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(handle, distance)| {
                let point = ray.point_at(distance);
                RaycastHit {
                    collider: ColliderHandle(handle),
                    point: Vec3::new(point.x, point.y, point.z),
                    distance,
                }
            })
    }

    /// Line-of-sight query that ignores the target body
    #[must_use]
    pub fn occlusion(&self) -> RaycastOcclusion<'_> {
        RaycastOcclusion {
            physics: self,
            ignore: self.target,
        }
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldBuilder for Physics {
    fn build_level(&mut self, graph: &RoomGraph, geometry: &LevelGeometry) {
        for handle in std::mem::take(&mut self.level_colliders) {
            self.remove_collider(handle);
        }

        for volume in geometry.floors.iter().chain(&geometry.walls) {
            let handle = self.add_static_box(volume);
            self.level_colliders.push(handle);
        }

        self.query_pipeline.update(&self.collider_set);
        log::debug!(
            "Built collision for {} rooms ({} floors, {} walls)",
            graph.len(),
            geometry.floors.len(),
            geometry.walls.len()
        );
    }
}

/// Result of a raycast
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// The point of intersection
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// [`OcclusionQuery`] backed by ray casts against a [`Physics`] world
#[derive(Clone, Copy)]
pub struct RaycastOcclusion<'a> {
    physics: &'a Physics,
    ignore: Option<ColliderHandle>,
}

impl<'a> RaycastOcclusion<'a> {
    /// Query that sees through `ignore`
    #[must_use]
    pub fn new(physics: &'a Physics, ignore: Option<ColliderHandle>) -> Self {
        Self { physics, ignore }
    }
}

impl OcclusionQuery for RaycastOcclusion<'_> {
    fn is_blocked(&self, origin: Vec3, target: Vec3) -> bool {
        let to_target = target - origin;
        let distance = to_target.length();
        if distance <= f32::EPSILON {
            return false;
        }

        self.physics
            .raycast(origin, to_target / distance, distance, self.ignore)
            .is_some_and(|hit| hit.distance < distance - CONTACT_EPSILON)
    }
}
