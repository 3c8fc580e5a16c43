//! Per-tick gravity from the nearest planet and the nearest star.
//!
//! Effects are sampled for every near ship from its post-step position before any of
//! them is applied, so the order ships are visited in never matters.

use crate::object_manager::ObjectManager;
use crate::objects::ObjectId;
use engine_core::{math, Damage};
use glam::Vec2;
use physics::PhysicsWorld;
use procgen::{Planet, SolarSystem, STAR_HOT_RADIUS, STAR_ZONE_RADIUS};

/// A point mass with a bounded influence and a clamped falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GravitySource {
    Planet {
        center: Vec2,
        ground_height: f32,
        full_height: f32,
        min_ground_height: f32,
        grav_const: f32,
        /// Planet-frame "up" used when a ship sits exactly at the center.
        up: Vec2,
    },
    Star {
        center: Vec2,
        zone_radius: f32,
        hot_radius: f32,
        grav_const: f32,
    },
}

impl GravitySource {
    pub fn planet(planet: &Planet) -> Self {
        GravitySource::Planet {
            center: planet.position(),
            ground_height: planet.ground_height,
            full_height: planet.full_height(),
            min_ground_height: planet.min_ground_height(),
            grav_const: planet.grav_const,
            up: math::rotate(Vec2::Y, planet.angle()),
        }
    }

    pub fn star(system: &SolarSystem, grav_const: f32) -> Self {
        GravitySource::Star {
            center: system.position,
            zone_radius: STAR_ZONE_RADIUS,
            hot_radius: STAR_HOT_RADIUS,
            grav_const,
        }
    }

    pub fn center(&self) -> Vec2 {
        match *self {
            GravitySource::Planet { center, .. } | GravitySource::Star { center, .. } => center,
        }
    }

    /// Distance within which the source acts.
    pub fn influence_radius(&self) -> f32 {
        match *self {
            GravitySource::Planet { full_height, .. } => full_height,
            GravitySource::Star { zone_radius, .. } => zone_radius,
        }
    }

    /// Distance below which the pull stops growing.
    pub fn min_falloff(&self) -> f32 {
        match *self {
            GravitySource::Planet { ground_height, .. } => ground_height,
            GravitySource::Star { hot_radius, .. } => hot_radius,
        }
    }

    fn grav_const(&self) -> f32 {
        match *self {
            GravitySource::Planet { grav_const, .. } | GravitySource::Star { grav_const, .. } => {
                grav_const
            }
        }
    }

    /// Acceleration toward the center. Zero at the center itself.
    pub fn acceleration(&self, pos: Vec2) -> Vec2 {
        let delta = self.center() - pos;
        let dist = delta.length().max(self.min_falloff()).max(f32::EPSILON);
        delta.normalize_or_zero() * (self.grav_const() / (dist * dist))
    }
}

/// What gravity does to one ship this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GravityEffect {
    None,
    Pull(Vec2),
    Burn { acceleration: Vec2, damage: f32 },
    Recover { to: Vec2 },
}

/// Sources relevant this tick plus the tunables that shape their effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityField {
    pub planet: Option<GravitySource>,
    pub star: Option<GravitySource>,
    /// Fire damage per second inside a star's hot radius.
    pub star_damage: f32,
    /// Distance past the atmosphere edge where recovered ships reappear.
    pub recovery_margin: f32,
}

impl GravityField {
    pub fn sample(&self, pos: Vec2, recoverable: bool, dt: f32) -> GravityEffect {
        if let Some(planet @ GravitySource::Planet {
            center,
            full_height,
            min_ground_height,
            up,
            ..
        }) = self.planet
        {
            let offset = pos - center;
            let dist = offset.length();
            if dist < full_height {
                if recoverable && dist <= min_ground_height {
                    let out = offset.try_normalize().unwrap_or(up);
                    return GravityEffect::Recover {
                        to: center + out * (full_height + self.recovery_margin),
                    };
                }
                return GravityEffect::Pull(planet.acceleration(pos));
            }
        }

        if let Some(star @ GravitySource::Star {
            center,
            zone_radius,
            hot_radius,
            ..
        }) = self.star
        {
            let dist = pos.distance(center);
            if dist < zone_radius {
                let acceleration = star.acceleration(pos);
                if dist < hot_radius {
                    return GravityEffect::Burn {
                        acceleration,
                        damage: self.star_damage * dt,
                    };
                }
                return GravityEffect::Pull(acceleration);
            }
        }

        GravityEffect::None
    }

    /// Sample every near ship, then apply the effects.
    pub fn apply(
        &self,
        manager: &mut ObjectManager,
        physics: &mut PhysicsWorld,
        dt: f32,
    ) -> Vec<(ObjectId, GravityEffect)> {
        let effects: Vec<(ObjectId, GravityEffect)> = manager
            .near_objects()
            .filter_map(|(id, object)| {
                let ship = object.as_ship()?;
                let recoverable = !ship.state.hull.is_station();
                match self.sample(ship.transform.position, recoverable, dt) {
                    GravityEffect::None => None,
                    effect => Some((id, effect)),
                }
            })
            .collect();

        for (id, effect) in &effects {
            let Some(ship) = manager.near_mut(*id).and_then(|o| o.as_ship_mut()) else {
                continue;
            };
            match *effect {
                GravityEffect::None => {}
                GravityEffect::Pull(acceleration) => {
                    let mass = ship.mass(physics);
                    physics.apply_impulse(ship.body.rigid_body, acceleration * mass * dt);
                }
                GravityEffect::Burn {
                    acceleration,
                    damage,
                } => {
                    let mass = ship.mass(physics);
                    physics.apply_impulse(ship.body.rigid_body, acceleration * mass * dt);
                    ship.take_damage(Damage::fire(damage));
                }
                GravityEffect::Recover { to } => {
                    log::debug!("Recovering ship {} from inside the ground", id);
                    ship.recover(physics, to);
                }
            }
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn planet_at_origin() -> GravitySource {
        GravitySource::Planet {
            center: Vec2::ZERO,
            ground_height: 40.0,
            full_height: 50.0,
            min_ground_height: 34.0,
            grav_const: 0.5 * 40.0 * 40.0,
            up: Vec2::Y,
        }
    }

    fn field(planet: Option<GravitySource>, star: Option<GravitySource>) -> GravityField {
        GravityField {
            planet,
            star,
            star_damage: 4.0,
            recovery_margin: 1.0,
        }
    }

    #[test]
    fn atmosphere_bounds_the_pull() {
        let f = field(Some(planet_at_origin()), None);
        match f.sample(Vec2::new(45.0, 0.0), true, 0.1) {
            GravityEffect::Pull(a) => {
                assert!(a.x < 0.0);
                assert!((a.length() - 800.0 / (45.0 * 45.0)).abs() < 1e-4);
            }
            other => panic!("expected pull, got {other:?}"),
        }
        assert_eq!(f.sample(Vec2::new(60.0, 0.0), true, 0.1), GravityEffect::None);
    }

    #[test]
    fn falloff_is_clamped_at_ground_radius() {
        let planet = planet_at_origin();
        let inside = planet.acceleration(Vec2::new(10.0, 0.0)).length();
        let at_ground = planet.acceleration(Vec2::new(40.0, 0.0)).length();
        assert!((inside - at_ground).abs() < 1e-5);
        let center = planet.acceleration(Vec2::ZERO);
        assert!(center.is_finite());
        assert_eq!(center, Vec2::ZERO);
    }

    #[test]
    fn embedded_ship_is_recovered_straight_up() {
        let f = field(Some(planet_at_origin()), None);
        assert_eq!(
            f.sample(Vec2::ZERO, true, 0.1),
            GravityEffect::Recover {
                to: Vec2::new(0.0, 51.0)
            }
        );
        match f.sample(Vec2::new(-20.0, 0.0), true, 0.1) {
            GravityEffect::Recover { to } => assert!((to - Vec2::new(-51.0, 0.0)).length() < 1e-4),
            other => panic!("expected recovery, got {other:?}"),
        }
        assert!(matches!(f.sample(Vec2::ZERO, false, 0.1), GravityEffect::Pull(_)));
    }

    #[test]
    fn star_burns_only_inside_hot_radius() {
        let star = GravitySource::Star {
            center: Vec2::new(500.0, 0.0),
            zone_radius: STAR_ZONE_RADIUS,
            hot_radius: STAR_HOT_RADIUS,
            grav_const: 2000.0,
        };
        let f = field(None, Some(star));
        let warm = Vec2::new(500.0 - 70.0, 0.0);
        let hot = Vec2::new(500.0 - 30.0, 0.0);
        assert!(matches!(f.sample(warm, true, 0.5), GravityEffect::Pull(_)));
        match f.sample(hot, true, 0.5) {
            GravityEffect::Burn { damage, .. } => assert!((damage - 2.0).abs() < 1e-6),
            other => panic!("expected burn, got {other:?}"),
        }
    }

    #[test]
    fn planet_takes_precedence_over_star() {
        let star = GravitySource::Star {
            center: Vec2::ZERO,
            zone_radius: 1000.0,
            hot_radius: 1.0,
            grav_const: 2000.0,
        };
        let f = field(Some(planet_at_origin()), Some(star));
        match f.sample(Vec2::new(45.0, 0.0), true, 0.1) {
            GravityEffect::Pull(a) => assert!((a.length() - 800.0 / 2025.0).abs() < 1e-4),
            other => panic!("expected planet pull, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn effects_are_always_finite(x in -200.0f32..200.0, y in -200.0f32..200.0) {
            let star = GravitySource::Star {
                center: Vec2::new(30.0, 0.0),
                zone_radius: STAR_ZONE_RADIUS,
                hot_radius: STAR_HOT_RADIUS,
                grav_const: 2000.0,
            };
            let f = field(Some(planet_at_origin()), Some(star));
            match f.sample(Vec2::new(x, y), true, 0.1) {
                GravityEffect::None => {}
                GravityEffect::Pull(a) => prop_assert!(a.is_finite()),
                GravityEffect::Burn { acceleration, damage } => {
                    prop_assert!(acceleration.is_finite() && damage.is_finite());
                }
                GravityEffect::Recover { to } => {
                    prop_assert!((to.length() - 51.0).abs() < 1e-3);
                }
            }
        }
    }
}
