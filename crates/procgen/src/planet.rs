//! Orbiting planets.
//!
//! A planet's pose is never integrated: position, velocity and facing are recomputed
//! from the orbital parameters and the planet's elapsed time (kept as `f64`) on every
//! advance, so planets stay exactly on their orbit however long the game runs.

use crate::config::PlanetConfig;
use engine_core::math;
use glam::Vec2;
use rand::prelude::*;
use std::f32::consts::FRAC_PI_2;
use std::f64::consts::TAU;
use std::sync::Arc;

/// Atmosphere thickness above the ground of every planet.
pub const ATMOSPHERE_HEIGHT: f32 = 14.0;
/// Largest ground radius a planet can have.
pub const MAX_GROUND_HEIGHT: f32 = 25.0;
/// How far above the ground the camera may be when the planet materializes.
pub const MAX_SKY_HEIGHT_FROM_GROUND: f32 = 1.5 * ATMOSPHERE_HEIGHT;

/// Orbital parameters, all angles in radians and speeds in rad/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    /// Distance from the system center.
    pub distance: f32,
    /// Initial angle of the planet as seen from the system center.
    pub angle_to_system: f32,
    pub orbit_speed: f32,
    /// Initial facing of the planet's surface.
    pub angle: f32,
    pub rotation_speed: f32,
}

/// A planet circling its star.
#[derive(Debug, Clone)]
pub struct Planet {
    pub name: String,
    pub config: Arc<PlanetConfig>,
    /// Index of the owning system in the galaxy.
    pub system: usize,
    pub system_center: Vec2,
    pub orbit: Orbit,
    pub ground_height: f32,
    pub atmosphere_height: f32,
    pub grav_const: f32,

    elapsed: f64,
    objects_created: bool,
    min_ground_height: f32,
    landing_places: Vec<Vec2>,

    position: Vec2,
    velocity: Vec2,
    angle_to_system: f32,
    angle: f32,
}

impl Planet {
    pub fn new(
        name: String,
        config: Arc<PlanetConfig>,
        system: usize,
        system_center: Vec2,
        orbit: Orbit,
        ground_height: f32,
        rng: &mut StdRng,
    ) -> Self {
        let grav = if config.max_grav > config.min_grav {
            rng.gen_range(config.min_grav..config.max_grav)
        } else {
            config.min_grav
        };
        let mut planet = Self {
            name,
            config,
            system,
            system_center,
            orbit,
            ground_height,
            atmosphere_height: ATMOSPHERE_HEIGHT,
            grav_const: grav * ground_height * ground_height,
            elapsed: 0.0,
            objects_created: false,
            min_ground_height: ground_height,
            landing_places: Vec::new(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle_to_system: 0.0,
            angle: 0.0,
        };
        planet.update_pose();
        planet
    }

    /// Move the planet `dt` seconds along its orbit and rotation.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt as f64;
        self.update_pose();
    }

    /// Jump to an absolute elapsed time.
    pub fn set_elapsed(&mut self, elapsed: f64) {
        self.elapsed = elapsed;
        self.update_pose();
    }

    fn update_pose(&mut self) {
        let elapsed = self.elapsed;
        let phase = move |initial: f32, speed: f32| -> f32 {
            (initial as f64 + speed as f64 * elapsed).rem_euclid(TAU) as f32
        };
        self.angle_to_system = phase(self.orbit.angle_to_system, self.orbit.orbit_speed);
        self.angle = phase(self.orbit.angle, self.orbit.rotation_speed);
        self.position =
            self.system_center + math::from_angle_len(self.angle_to_system, self.orbit.distance);
        self.velocity = math::from_angle_len(
            self.angle_to_system + FRAC_PI_2,
            self.orbit.orbit_speed * self.orbit.distance,
        );
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Orbital velocity of the planet center.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Facing of the surface; planet-local vectors are rotated by this.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn angle_to_system(&self) -> f32 {
        self.angle_to_system
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Ground plus atmosphere.
    pub fn full_height(&self) -> f32 {
        self.ground_height + self.atmosphere_height
    }

    /// Velocity of the surface frame at a world point: orbit plus spin.
    pub fn velocity_at(&self, pos: Vec2) -> Vec2 {
        let r = pos - self.position;
        self.velocity + Vec2::new(-r.y, r.x) * self.orbit.rotation_speed
    }

    pub fn is_near_ground(&self, pos: Vec2) -> bool {
        self.position.distance(pos) - self.ground_height < 0.25 * self.atmosphere_height
    }

    /// Planet-local vector to world position.
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + math::rotate(local, self.angle)
    }

    /// World position to planet-local vector.
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        math::rotate(world - self.position, -self.angle)
    }

    pub fn objects_created(&self) -> bool {
        self.objects_created
    }

    /// Whether the camera is close enough to trigger materialization.
    pub fn should_materialize(&self, camera: Vec2) -> bool {
        !self.objects_created
            && camera.distance(self.position) < self.ground_height + MAX_SKY_HEIGHT_FROM_GROUND
    }

    /// Record the result of materialization. Later calls are ignored.
    pub fn mark_materialized(&mut self, min_ground_height: f32, landing_places: Vec<Vec2>) {
        if self.objects_created {
            log::warn!("Planet {} already materialized", self.name);
            return;
        }
        self.objects_created = true;
        self.min_ground_height = min_ground_height;
        self.landing_places = landing_places;
    }

    /// Innermost radius of solid ground. Equals the ground height until materialized.
    pub fn min_ground_height(&self) -> f32 {
        self.min_ground_height
    }

    /// Cached planet-local landing places.
    pub fn landing_places(&self) -> &[Vec2] {
        &self.landing_places
    }
}
