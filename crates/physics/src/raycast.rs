//! Segment casts used to find landing spots on planet ground.

use crate::PhysicsWorld;
use engine_core::Vec2;
use rapier2d::prelude::*;

/// Result of a segment cast.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// World position of the hit.
    pub point: Vec2,
    /// Surface normal at the hit point.
    pub normal: Vec2,
    /// Position of the hit along the segment, in `[0, 1]`.
    pub fraction: f32,
}

impl PhysicsWorld {
    /// Cast the segment `from -> to` and return the closest hit against colliders
    /// matching `groups`.
    pub fn cast_segment(&self, from: Vec2, to: Vec2, groups: InteractionGroups) -> Option<RayHit> {
        let dir = to - from;
        if dir == Vec2::ZERO {
            return None;
        }
        let ray = Ray::new(point![from.x, from.y], vector![dir.x, dir.y]);
        let filter = QueryFilter::new().groups(groups);

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                1.0,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RayHit {
                    collider,
                    point: Vec2::new(point.x, point.y),
                    normal: Vec2::new(intersection.normal.x, intersection.normal.y),
                    fraction: intersection.time_of_impact,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollisionGroup;

    #[test]
    fn segment_hits_ground_box_from_above() {
        let mut world = PhysicsWorld::new();
        let ground = world.add_fixed_body(Vec2::ZERO, 0.0, 0);
        world.add_box_collider(ground, Vec2::new(5.0, 1.0), CollisionGroup::ground());
        world.update_query_pipeline();

        let hit = world
            .cast_segment(Vec2::new(0.0, 10.0), Vec2::new(0.0, -10.0), CollisionGroup::ground_query())
            .expect("segment should hit the box");
        assert!((hit.point.y - 1.0).abs() < 1e-4);
        assert!((hit.normal - Vec2::Y).length() < 1e-4);
        assert!((hit.fraction - 0.45).abs() < 1e-4);
    }

    #[test]
    fn ground_query_ignores_ships() {
        let mut world = PhysicsWorld::new();
        let ship = world.add_fixed_body(Vec2::ZERO, 0.0, 0);
        world.add_ball_collider(ship, 1.0, CollisionGroup::ship());
        world.update_query_pipeline();

        let hit = world.cast_segment(
            Vec2::new(0.0, 10.0),
            Vec2::new(0.0, -10.0),
            CollisionGroup::ground_query(),
        );
        assert!(hit.is_none());
    }
}
