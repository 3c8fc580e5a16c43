//! Ships and stations.

use super::{ObjectId, UpdateContext};
use crate::drawables::{DrawLayer, SpriteDesc, SpriteInstance};
use engine_core::{math, Damage, Faction, Health, Transform2D, Velocity};
use glam::Vec2;
use physics::{CollisionGroup, PhysicsBody, PhysicsWorld};
use procgen::HullConfig;
use std::f32::consts::FRAC_PI_2;

/// Top speed a guard uses to return to its post.
const GUARD_RETURN_SPEED: f32 = 2.0;

/// Where a still guard holds position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Fixed to a planet surface, in planet-local coordinates.
    Planet {
        planet: usize,
        local: Vec2,
        local_angle: f32,
    },
    /// Fixed point in world space.
    Fixed { position: Vec2 },
}

/// Behaviour driving a ship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pilot {
    Idle,
    StillGuard(Anchor),
    Orbiter {
        planet: usize,
        height: f32,
        clockwise: bool,
    },
}

/// Everything about a ship that survives streaming unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipState {
    pub hull: HullConfig,
    pub faction: Faction,
    pub pilot: Pilot,
    pub health: Health,
}

impl ShipState {
    pub fn new(hull: HullConfig, faction: Faction, pilot: Pilot) -> Self {
        let health = Health::new(hull.max_life);
        Self {
            hull,
            faction,
            pilot,
            health,
        }
    }

    fn sprite(&self, transform: &Transform2D) -> SpriteInstance {
        let layer = if self.hull.is_station() {
            DrawLayer::Structures
        } else {
            DrawLayer::Ships
        };
        SpriteDesc::new(self.hull.name.clone(), self.hull.size, layer).instance(transform)
    }
}

/// Orbital speed at `height` above a planet center.
pub fn orbit_speed(grav_const: f32, height: f32) -> f32 {
    (grav_const / height.max(f32::EPSILON)).sqrt()
}

/// Velocity of a circular orbit at world `angle` around the planet.
pub fn orbit_velocity(angle: f32, speed: f32, clockwise: bool) -> Vec2 {
    let turn = if clockwise { -FRAC_PI_2 } else { FRAC_PI_2 };
    math::from_angle_len(angle + turn, speed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FarShip {
    pub state: ShipState,
    pub transform: Transform2D,
    pub velocity: Velocity,
}

impl FarShip {
    pub fn new(state: ShipState, transform: Transform2D, velocity: Velocity) -> Self {
        Self {
            state,
            transform,
            velocity,
        }
    }

    pub fn radius(&self) -> f32 {
        self.state.hull.approx_radius
    }

    pub fn update(&mut self, ctx: &UpdateContext<'_>) {
        match self.state.pilot {
            Pilot::StillGuard(Anchor::Planet {
                planet,
                local,
                local_angle,
            }) => {
                if let Some(p) = ctx.planets.get(planet) {
                    self.transform.position = p.to_world(local);
                    self.transform.angle = math::norm_angle(p.angle() + local_angle);
                    self.velocity = Velocity::with_angular(
                        p.velocity_at(self.transform.position),
                        p.orbit.rotation_speed,
                    );
                    return;
                }
            }
            Pilot::StillGuard(Anchor::Fixed { position }) => {
                self.transform.position = position;
                self.velocity = Velocity::default();
                return;
            }
            Pilot::Orbiter {
                planet,
                height,
                clockwise,
            } => {
                if let Some(p) = ctx.planets.get(planet) {
                    let speed = orbit_speed(p.grav_const, height);
                    let sign = if clockwise { -1.0 } else { 1.0 };
                    let angle = math::angle_of(self.transform.position - p.position())
                        + sign * speed / height * ctx.dt;
                    self.transform.position = p.position() + math::from_angle_len(angle, height);
                    self.transform.angle = math::norm_angle(angle + sign * FRAC_PI_2);
                    self.velocity = Velocity::new(orbit_velocity(angle, speed, clockwise));
                    return;
                }
            }
            Pilot::Idle => {}
        }
        self.transform.position += self.velocity.linear * ctx.dt;
        self.transform.angle = math::norm_angle(self.transform.angle + self.velocity.angular * ctx.dt);
    }

    pub fn should_be_removed(&self) -> bool {
        self.state.health.is_dead()
    }

    pub fn sprite(&self) -> SpriteInstance {
        self.state.sprite(&self.transform)
    }
}

/// A simulated ship with a rigid body.
#[derive(Debug)]
pub struct NearShip {
    pub state: ShipState,
    pub body: PhysicsBody,
    pub transform: Transform2D,
    pub velocity: Velocity,
}

impl NearShip {
    pub fn spawn(id: ObjectId, far: FarShip, physics: &mut PhysicsWorld) -> Self {
        let groups = if far.state.hull.is_station() {
            CollisionGroup::station()
        } else {
            CollisionGroup::ship()
        };
        let body = physics.spawn_ball(
            far.transform,
            far.velocity,
            far.state.hull.approx_radius,
            groups,
            id.user_data(),
        );
        Self {
            state: far.state,
            body,
            transform: far.transform,
            velocity: far.velocity,
        }
    }

    /// Pull the post-step pose from physics, then steer.
    pub fn update(&mut self, physics: &mut PhysicsWorld, ctx: &UpdateContext<'_>) {
        self.sync(physics);
        let Pilot::StillGuard(anchor) = self.state.pilot else {
            return;
        };
        let post = match anchor {
            Anchor::Planet { planet, local, .. } => ctx.planets.get(planet).map(|p| {
                let target = p.to_world(local);
                (target, p.velocity_at(target), p.orbit.rotation_speed)
            }),
            Anchor::Fixed { position } => Some((position, Vec2::ZERO, 0.0)),
        };
        if let Some((target, carry, spin)) = post {
            let to_post = (target - self.transform.position).clamp_length_max(GUARD_RETURN_SPEED);
            self.velocity = Velocity::with_angular(carry + to_post, spin);
            physics.set_velocity(self.body.rigid_body, self.velocity);
        }
    }

    pub fn sync(&mut self, physics: &PhysicsWorld) {
        if let Some(t) = physics.body_transform(self.body.rigid_body) {
            self.transform = t;
        }
        if let Some(v) = physics.body_velocity(self.body.rigid_body) {
            self.velocity = v;
        }
    }

    pub fn mass(&self, physics: &PhysicsWorld) -> f32 {
        physics.body_mass(self.body.rigid_body)
    }

    pub fn take_damage(&mut self, damage: Damage) {
        self.state.health.take_damage(damage.amount);
    }

    /// Put the ship back at `position` at rest, keeping its heading.
    pub fn recover(&mut self, physics: &mut PhysicsWorld, position: Vec2) {
        physics.teleport(self.body.rigid_body, position);
        self.transform.position = position;
        self.velocity = Velocity::default();
    }

    pub fn should_be_removed(&self) -> bool {
        self.state.health.is_dead()
    }

    pub fn sprite(&self) -> SpriteInstance {
        self.state.sprite(&self.transform)
    }

    pub fn into_far(mut self, physics: &mut PhysicsWorld) -> FarShip {
        self.sync(physics);
        physics.remove_body(self.body.rigid_body);
        FarShip::new(self.state, self.transform, self.velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::{HullKind, Orbit, Planet, PlanetConfig};
    use rand::prelude::*;
    use std::sync::Arc;

    fn planet() -> Planet {
        Planet::new(
            "Test".to_string(),
            Arc::new(PlanetConfig::default()),
            0,
            Vec2::ZERO,
            Orbit {
                distance: 100.0,
                angle_to_system: 0.0,
                orbit_speed: 0.0,
                angle: 0.0,
                rotation_speed: 0.1,
            },
            20.0,
            &mut StdRng::seed_from_u64(0),
        )
    }

    #[test]
    fn far_idle_ship_drifts() {
        let state = ShipState::new(HullConfig::default(), Faction::Hostile, Pilot::Idle);
        let mut ship = FarShip::new(
            state,
            Transform2D::from_position(Vec2::ZERO),
            Velocity::new(Vec2::new(2.0, 0.0)),
        );
        ship.update(&UpdateContext {
            camera: Vec2::ZERO,
            dt: 0.5,
            planets: &[],
        });
        assert!((ship.transform.position - Vec2::new(1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn far_orbiter_keeps_its_height() {
        let mut p = planet();
        let height = 30.0;
        let state = ShipState::new(
            HullConfig::default(),
            Faction::Hostile,
            Pilot::Orbiter {
                planet: 0,
                height,
                clockwise: true,
            },
        );
        let mut ship = FarShip::new(
            state,
            Transform2D::from_position(p.position() + Vec2::new(height, 0.0)),
            Velocity::default(),
        );
        for _ in 0..600 {
            p.advance(1.0 / 60.0);
            ship.update(&UpdateContext {
                camera: Vec2::ZERO,
                dt: 1.0 / 60.0,
                planets: std::slice::from_ref(&p),
            });
        }
        assert!((ship.transform.position.distance(p.position()) - height).abs() < 1e-2);
    }

    #[test]
    fn planet_guard_rides_the_surface() {
        let mut p = planet();
        let local = Vec2::new(0.0, 21.0);
        let state = ShipState::new(
            HullConfig::new("outpost", 6.0, HullKind::Station, 500.0),
            Faction::Friendly,
            Pilot::StillGuard(Anchor::Planet {
                planet: 0,
                local,
                local_angle: 0.0,
            }),
        );
        let mut ship = FarShip::new(state, Transform2D::default(), Velocity::default());
        p.advance(3.0);
        ship.update(&UpdateContext {
            camera: Vec2::ZERO,
            dt: 1.0 / 60.0,
            planets: std::slice::from_ref(&p),
        });
        assert!(ship.transform.position.distance(p.to_world(local)) < 1e-4);
    }

    #[test]
    fn damage_kills_ship() {
        let mut physics = PhysicsWorld::new();
        let state = ShipState::new(
            HullConfig::new("dart", 1.0, HullKind::Standard, 10.0),
            Faction::Hostile,
            Pilot::Idle,
        );
        let far = FarShip::new(state, Transform2D::default(), Velocity::default());
        let mut near = NearShip::spawn(ObjectId(1), far, &mut physics);
        near.take_damage(Damage::fire(4.0));
        assert!(!near.should_be_removed());
        near.take_damage(Damage::fire(7.0));
        assert!(near.should_be_removed());
    }
}
