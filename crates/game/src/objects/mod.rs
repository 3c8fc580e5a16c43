//! Streamable world objects and their two representations.
//!
//! Every object exists either as a *far* value (plain data, cheap extrapolation, no
//! physics) or as a *near* value (physics body, drawables, pilot). The kind set is
//! closed, so conversion between the two is a `match` in [`to_far`] and [`to_near`].

mod maze_tile;
mod ship;
mod sprites;
mod tile;

pub use maze_tile::*;
pub use ship::*;
pub use sprites::*;
pub use tile::*;

use crate::drawables::SpriteInstance;
use engine_core::{math, Transform2D};
use glam::Vec2;
use physics::PhysicsWorld;
use procgen::Planet;
use std::f32::consts::FRAC_PI_2;
use std::fmt;

/// Stable identity shared by the far and near representation of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// Tag stored on physics bodies.
    pub fn user_data(self) -> u128 {
        self.0 as u128
    }

    pub fn from_user_data(data: u128) -> Self {
        Self(data as u64)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only world state objects need while updating.
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    pub camera: Vec2,
    pub dt: f32,
    pub planets: &'a [Planet],
}

/// Frame of a planet-bound object at `angle_rel` and `dist` from the center.
/// Local +Y points away from the planet.
pub fn planet_frame(planet: &Planet, angle_rel: f32, dist: f32) -> Transform2D {
    Transform2D::new(
        planet.to_world(math::from_angle_len(angle_rel, dist)),
        planet.angle() + angle_rel - FRAC_PI_2,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Ship,
    Tile,
    Sprites,
    MazeTile,
}

/// Inactive representation.
#[derive(Debug, Clone, PartialEq)]
pub enum FarObject {
    Ship(FarShip),
    Tile(FarTile),
    Sprites(PlanetSprites),
    MazeTile(MazeTile),
}

impl FarObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            FarObject::Ship(_) => ObjectKind::Ship,
            FarObject::Tile(_) => ObjectKind::Tile,
            FarObject::Sprites(_) => ObjectKind::Sprites,
            FarObject::MazeTile(_) => ObjectKind::MazeTile,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            FarObject::Ship(s) => s.transform.position,
            FarObject::Tile(t) => t.transform.position,
            FarObject::Sprites(s) => s.transform.position,
            FarObject::MazeTile(t) => t.transform.position,
        }
    }

    /// Radius used for streaming distance checks.
    pub fn radius(&self) -> f32 {
        match self {
            FarObject::Ship(s) => s.radius(),
            FarObject::Tile(t) => t.radius(),
            FarObject::Sprites(s) => s.radius(),
            FarObject::MazeTile(t) => t.radius(),
        }
    }

    /// Cheap extrapolation.
    pub fn update(&mut self, ctx: &UpdateContext<'_>) {
        match self {
            FarObject::Ship(s) => s.update(ctx),
            FarObject::Tile(t) => t.update(ctx),
            FarObject::Sprites(s) => s.update(ctx),
            FarObject::MazeTile(_) => {}
        }
    }

    pub fn should_be_removed(&self) -> bool {
        match self {
            FarObject::Ship(s) => s.should_be_removed(),
            _ => false,
        }
    }

    pub fn as_ship(&self) -> Option<&FarShip> {
        match self {
            FarObject::Ship(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut FarShip> {
        match self {
            FarObject::Ship(s) => Some(s),
            _ => None,
        }
    }
}

/// Active representation.
#[derive(Debug)]
pub enum NearObject {
    Ship(NearShip),
    Tile(NearTile),
    Sprites(NearSprites),
    MazeTile(NearMazeTile),
}

impl NearObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            NearObject::Ship(_) => ObjectKind::Ship,
            NearObject::Tile(_) => ObjectKind::Tile,
            NearObject::Sprites(_) => ObjectKind::Sprites,
            NearObject::MazeTile(_) => ObjectKind::MazeTile,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            NearObject::Ship(s) => s.transform.position,
            NearObject::Tile(t) => t.far.transform.position,
            NearObject::Sprites(s) => s.sprites.transform.position,
            NearObject::MazeTile(t) => t.tile.transform.position,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            NearObject::Ship(s) => s.state.hull.approx_radius,
            NearObject::Tile(t) => t.far.radius(),
            NearObject::Sprites(s) => s.sprites.radius(),
            NearObject::MazeTile(t) => t.tile.radius(),
        }
    }

    /// Sync from physics and run behaviour. Called after the physics step.
    pub fn update(&mut self, physics: &mut PhysicsWorld, ctx: &UpdateContext<'_>) {
        match self {
            NearObject::Ship(s) => s.update(physics, ctx),
            NearObject::Tile(t) => t.update(physics, ctx),
            NearObject::Sprites(s) => s.update(ctx),
            NearObject::MazeTile(_) => {}
        }
    }

    pub fn should_be_removed(&self) -> bool {
        match self {
            NearObject::Ship(s) => s.should_be_removed(),
            _ => false,
        }
    }

    pub fn collect_sprites(&self, out: &mut Vec<SpriteInstance>) {
        match self {
            NearObject::Ship(s) => out.push(s.sprite()),
            NearObject::Tile(t) => out.push(t.far.sprite()),
            NearObject::Sprites(s) => s.collect_sprites(out),
            NearObject::MazeTile(t) => out.push(t.tile.sprite()),
        }
    }

    /// Destroy the object's physics bodies.
    pub fn release(self, physics: &mut PhysicsWorld) {
        // The far value is dropped; only the body teardown matters here.
        let _ = to_far(self, physics);
    }

    pub fn as_ship(&self) -> Option<&NearShip> {
        match self {
            NearObject::Ship(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut NearShip> {
        match self {
            NearObject::Ship(s) => Some(s),
            _ => None,
        }
    }
}

/// Demote: capture the live state and release every physics body.
pub fn to_far(near: NearObject, physics: &mut PhysicsWorld) -> FarObject {
    match near {
        NearObject::Ship(s) => FarObject::Ship(s.into_far(physics)),
        NearObject::Tile(t) => FarObject::Tile(t.into_far(physics)),
        NearObject::Sprites(s) => FarObject::Sprites(s.sprites),
        NearObject::MazeTile(t) => FarObject::MazeTile(t.into_far(physics)),
    }
}

/// Promote: rebuild bodies and drawables from the far description.
pub fn to_near(id: ObjectId, far: FarObject, physics: &mut PhysicsWorld) -> NearObject {
    match far {
        FarObject::Ship(s) => NearObject::Ship(NearShip::spawn(id, s, physics)),
        FarObject::Tile(t) => NearObject::Tile(NearTile::spawn(id, t, physics)),
        FarObject::Sprites(s) => NearObject::Sprites(NearSprites { sprites: s }),
        FarObject::MazeTile(t) => NearObject::MazeTile(NearMazeTile::spawn(id, t, physics)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{Faction, Velocity};
    use procgen::HullConfig;

    fn far_ship() -> FarObject {
        FarObject::Ship(FarShip::new(
            ShipState::new(HullConfig::default(), Faction::Hostile, Pilot::Idle),
            Transform2D::new(Vec2::new(12.0, -4.0), 0.75),
            Velocity::with_angular(Vec2::new(1.5, 2.0), 0.1),
        ))
    }

    #[test]
    fn ship_round_trip_preserves_motion_state() {
        let mut physics = PhysicsWorld::new();
        let far = far_ship();
        let near = to_near(ObjectId(3), far.clone(), &mut physics);
        assert_eq!(physics.body_count(), 1);

        let back = to_far(near, &mut physics);
        assert_eq!(physics.body_count(), 0);
        let (a, b) = (far.as_ship().unwrap(), back.as_ship().unwrap());
        assert!((a.transform.position - b.transform.position).length() < 1e-5);
        assert!(math::angle_diff(a.transform.angle, b.transform.angle) < 1e-5);
        assert!((a.velocity.linear - b.velocity.linear).length() < 1e-5);
        assert!((a.velocity.angular - b.velocity.angular).abs() < 1e-5);
        assert_eq!(a.state, b.state);
    }

    #[test]
    fn near_body_carries_object_id() {
        let mut physics = PhysicsWorld::new();
        let near = to_near(ObjectId(41), far_ship(), &mut physics);
        let body = near.as_ship().unwrap().body.rigid_body;
        let tag = physics.body_user_data(body).unwrap();
        assert_eq!(ObjectId::from_user_data(tag), ObjectId(41));
    }
}
