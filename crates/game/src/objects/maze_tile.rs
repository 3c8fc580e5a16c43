//! Maze walls and floor pieces.

use super::ObjectId;
use crate::drawables::{DrawLayer, SpriteDesc, SpriteInstance};
use engine_core::Transform2D;
use glam::Vec2;
use physics::{CollisionGroup, PhysicsBody, PhysicsWorld};
use procgen::MAZE_TILE_SIZE;

/// Half thickness of a wall's collision box.
pub const WALL_HALF_THICKNESS: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct MazeTile {
    pub sprite: String,
    pub wall: bool,
    /// Inner pieces sit between two walkable cells; border pieces face open space.
    pub inner: bool,
    pub transform: Transform2D,
    pub flipped: bool,
}

impl MazeTile {
    pub fn radius(&self) -> f32 {
        MAZE_TILE_SIZE / 2.0
    }

    pub fn sprite(&self) -> SpriteInstance {
        let mut desc = SpriteDesc::new(self.sprite.clone(), MAZE_TILE_SIZE, DrawLayer::Structures);
        desc.flipped = self.flipped;
        desc.instance(&self.transform)
    }
}

#[derive(Debug)]
pub struct NearMazeTile {
    pub tile: MazeTile,
    pub body: Option<PhysicsBody>,
}

impl NearMazeTile {
    pub fn spawn(id: ObjectId, tile: MazeTile, physics: &mut PhysicsWorld) -> Self {
        let body = tile.wall.then(|| {
            let handle = physics.add_fixed_body(
                tile.transform.position,
                tile.transform.angle,
                id.user_data(),
            );
            let collider = physics.add_box_collider(
                handle,
                Vec2::new(MAZE_TILE_SIZE / 2.0, WALL_HALF_THICKNESS),
                CollisionGroup::structure(),
            );
            PhysicsBody::with_collider(handle, collider)
        });
        Self { tile, body }
    }

    pub fn into_far(self, physics: &mut PhysicsWorld) -> MazeTile {
        if let Some(body) = self.body {
            physics.remove_body(body.rigid_body);
        }
        self.tile
    }
}
