//! Ground tiles riding a planet's surface.

use super::{planet_frame, ObjectId, UpdateContext};
use crate::drawables::{DrawLayer, SpriteDesc, SpriteInstance};
use engine_core::Transform2D;
use glam::Vec2;
use physics::{CollisionGroup, PhysicsBody, PhysicsWorld};
use procgen::{Planet, Tile};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct FarTile {
    pub planet: usize,
    /// Planet-local angle of the tile center.
    pub angle_rel: f32,
    /// Distance of the tile center from the planet center.
    pub dist: f32,
    pub size: f32,
    pub tile: Arc<Tile>,
    pub transform: Transform2D,
}

impl FarTile {
    pub fn new(
        planet_index: usize,
        planet: &Planet,
        angle_rel: f32,
        dist: f32,
        size: f32,
        tile: Arc<Tile>,
    ) -> Self {
        Self {
            planet: planet_index,
            angle_rel,
            dist,
            size,
            tile,
            transform: planet_frame(planet, angle_rel, dist),
        }
    }

    /// Half the tile's diagonal.
    pub fn radius(&self) -> f32 {
        self.size * std::f32::consts::FRAC_1_SQRT_2
    }

    pub fn update(&mut self, ctx: &UpdateContext<'_>) {
        if let Some(p) = ctx.planets.get(self.planet) {
            self.transform = planet_frame(p, self.angle_rel, self.dist);
        }
    }

    /// Collision outline in body-local units.
    pub fn outline(&self) -> Vec<Vec2> {
        self.tile.points.iter().map(|p| *p * self.size).collect()
    }

    pub fn sprite(&self) -> SpriteInstance {
        SpriteDesc::new(self.tile.sprite.clone(), self.size, DrawLayer::Ground)
            .instance(&self.transform)
    }
}

/// A tile with a kinematic body, or none when the tile has no outline.
#[derive(Debug)]
pub struct NearTile {
    pub far: FarTile,
    pub body: Option<PhysicsBody>,
}

impl NearTile {
    pub fn spawn(id: ObjectId, far: FarTile, physics: &mut PhysicsWorld) -> Self {
        let body = far.tile.has_collision().then(|| {
            let handle = physics.add_kinematic_body(
                far.transform.position,
                far.transform.angle,
                id.user_data(),
            );
            let collider = physics.add_polygon_collider(handle, &far.outline(), CollisionGroup::ground());
            PhysicsBody::with_collider(handle, collider)
        });
        Self { far, body }
    }

    /// Follow the planet; the body reaches the new pose during the next step.
    pub fn update(&mut self, physics: &mut PhysicsWorld, ctx: &UpdateContext<'_>) {
        self.far.update(ctx);
        if let Some(body) = &self.body {
            physics.set_kinematic_target(body.rigid_body, self.far.transform);
        }
    }

    pub fn into_far(self, physics: &mut PhysicsWorld) -> FarTile {
        if let Some(body) = self.body {
            physics.remove_body(body.rigid_body);
        }
        self.far
    }
}
