//! Physics world management with Rapier2D.

use crate::collision::PhysicsBody;
use engine_core::{Transform2D, Vec2, Velocity};
use rapier2d::prelude::*;

/// Main physics world containing all simulation state.
///
/// Global gravity is zero: planets and stars pull on bodies through impulses
/// applied by the world core after every step.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world without global gravity.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update query pipeline for raycasting.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a dynamic rigid body (ships) and return its handle.
    pub fn add_dynamic_body(
        &mut self,
        position: Vec2,
        angle: f32,
        velocity: Velocity,
        user_data: u128,
    ) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .rotation(angle)
            .linvel(vector![velocity.linear.x, velocity.linear.y])
            .angvel(velocity.angular)
            .user_data(user_data)
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a kinematic rigid body (ground tiles riding a rotating planet).
    pub fn add_kinematic_body(&mut self, position: Vec2, angle: f32, user_data: u128) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![position.x, position.y])
            .rotation(angle)
            .user_data(user_data)
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a fixed rigid body (maze walls).
    pub fn add_fixed_body(&mut self, position: Vec2, angle: f32, user_data: u128) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::fixed()
            .translation(vector![position.x, position.y])
            .rotation(angle)
            .user_data(user_data)
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a convex polygon collider built from body-local points.
    ///
    /// Degenerate point sets fall back to a small box so the body still collides.
    pub fn add_polygon_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        points: &[Vec2],
        groups: InteractionGroups,
    ) -> ColliderHandle {
        let hull: Vec<Point<Real>> = points.iter().map(|p| point![p.x, p.y]).collect();
        let builder = match ColliderBuilder::convex_hull(&hull) {
            Some(builder) => builder,
            None => {
                log::warn!("Degenerate collider outline with {} points", points.len());
                ColliderBuilder::cuboid(0.1, 0.1)
            }
        };
        let collider = builder.collision_groups(groups).build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a circle collider to a rigid body.
    pub fn add_ball_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        radius: f32,
        groups: InteractionGroups,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius).collision_groups(groups).build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Add a box collider to a rigid body.
    pub fn add_box_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        half_extents: Vec2,
        groups: InteractionGroups,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .collision_groups(groups)
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Create a dynamic body with a ball collider in one go.
    pub fn spawn_ball(
        &mut self,
        transform: Transform2D,
        velocity: Velocity,
        radius: f32,
        groups: InteractionGroups,
        user_data: u128,
    ) -> PhysicsBody {
        let body = self.add_dynamic_body(transform.position, transform.angle, velocity, user_data);
        let collider = self.add_ball_collider(body, radius, groups);
        PhysicsBody::with_collider(body, collider)
    }

    /// Get the transform of a rigid body.
    pub fn body_transform(&self, handle: RigidBodyHandle) -> Option<Transform2D> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            Transform2D::new(Vec2::new(pos.x, pos.y), body.rotation().angle())
        })
    }

    /// Get the velocity of a rigid body.
    pub fn body_velocity(&self, handle: RigidBodyHandle) -> Option<Velocity> {
        self.rigid_body_set.get(handle).map(|body| {
            let v = body.linvel();
            Velocity::with_angular(Vec2::new(v.x, v.y), body.angvel())
        })
    }

    /// Mass of a rigid body, zero for unknown handles.
    pub fn body_mass(&self, handle: RigidBodyHandle) -> f32 {
        self.rigid_body_set
            .get(handle)
            .map(|body| body.mass())
            .unwrap_or(0.0)
    }

    /// User data stored on a rigid body.
    pub fn body_user_data(&self, handle: RigidBodyHandle) -> Option<u128> {
        self.rigid_body_set.get(handle).map(|body| body.user_data)
    }

    /// Set the pose a kinematic body moves to during the next step.
    pub fn set_kinematic_target(&mut self, handle: RigidBodyHandle, transform: Transform2D) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_next_kinematic_position(Isometry::new(
                vector![transform.position.x, transform.position.y],
                transform.angle,
            ));
        }
    }

    /// Apply an impulse to a dynamic body.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.apply_impulse(vector![impulse.x, impulse.y], true);
        }
    }

    /// Move a body to `position` keeping its angle and zeroing its velocity.
    pub fn teleport(&mut self, handle: RigidBodyHandle, position: Vec2) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(vector![position.x, position.y], true);
            body.set_linvel(vector![0.0, 0.0], true);
            body.set_angvel(0.0, true);
        }
    }

    /// Overwrite a body's velocity.
    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: Velocity) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(vector![velocity.linear.x, velocity.linear.y], true);
            body.set_angvel(velocity.angular, true);
        }
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Number of live rigid bodies.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollisionGroup;

    #[test]
    fn impulse_moves_dynamic_body() {
        let mut world = PhysicsWorld::new();
        let body = world.spawn_ball(
            Transform2D::default(),
            Velocity::default(),
            1.0,
            CollisionGroup::ship(),
            7,
        );
        let mass = world.body_mass(body.rigid_body);
        assert!(mass > 0.0);

        world.apply_impulse(body.rigid_body, Vec2::new(mass, 0.0));
        world.step(0.1);

        let v = world.body_velocity(body.rigid_body).unwrap();
        assert!((v.linear.x - 1.0).abs() < 1e-3);
        let t = world.body_transform(body.rigid_body).unwrap();
        assert!(t.position.x > 0.0);
        assert_eq!(world.body_user_data(body.rigid_body), Some(7));
    }

    #[test]
    fn teleport_clears_velocity() {
        let mut world = PhysicsWorld::new();
        let body = world.add_dynamic_body(Vec2::ZERO, 0.5, Velocity::new(Vec2::X * 5.0), 1);
        world.add_ball_collider(body, 0.5, CollisionGroup::ship());
        world.teleport(body, Vec2::new(10.0, 0.0));

        let t = world.body_transform(body).unwrap();
        assert_eq!(t.position, Vec2::new(10.0, 0.0));
        assert!((t.angle - 0.5).abs() < 1e-5);
        assert_eq!(world.body_velocity(body).unwrap().linear, Vec2::ZERO);
    }

    #[test]
    fn kinematic_body_reaches_target() {
        let mut world = PhysicsWorld::new();
        let body = world.add_kinematic_body(Vec2::ZERO, 0.0, 2);
        world.add_box_collider(body, Vec2::splat(0.5), CollisionGroup::ground());
        world.set_kinematic_target(body, Transform2D::new(Vec2::new(1.0, 2.0), 0.3));
        world.step(1.0 / 60.0);

        let t = world.body_transform(body).unwrap();
        assert!((t.position - Vec2::new(1.0, 2.0)).length() < 1e-4);
        assert!((t.angle - 0.3).abs() < 1e-4);
    }

    #[test]
    fn removed_body_is_gone() {
        let mut world = PhysicsWorld::new();
        let body = world.add_fixed_body(Vec2::ZERO, 0.0, 3);
        assert_eq!(world.body_count(), 1);
        world.remove_body(body);
        assert_eq!(world.body_count(), 0);
        assert!(world.body_transform(body).is_none());
    }
}
