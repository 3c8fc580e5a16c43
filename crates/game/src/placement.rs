//! Finding spots on a planet's ground by ray casting against its tiles.
//!
//! Results are planet-local vectors so they stay valid while the planet turns.

use engine_core::math;
use glam::Vec2;
use physics::{CollisionGroup, PhysicsWorld};
use procgen::Planet;
use rand::prelude::*;
use std::f32::consts::PI;

const TRIALS: usize = 20;
/// Exclusion tolerance of landing spots.
const LANDING_TOLERANCE: f32 = 1.0 * PI / 180.0;

/// Planet-local angular intervals already taken.
#[derive(Debug, Clone, Default)]
pub struct ConsumedAngles {
    taken: Vec<(f32, f32)>,
}

impl ConsumedAngles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, angle: f32, half_width: f32) {
        self.taken.push((angle, half_width));
    }

    /// Whether an object of `half_width` centered at `angle` overlaps a taken interval.
    pub fn is_consumed(&self, angle: f32, half_width: f32) -> bool {
        self.taken
            .iter()
            .any(|(a, w)| math::angle_diff(*a, angle) < w + half_width)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

/// A landing spot at least a degree away from every consumed angle.
pub fn find_landing(
    planet: &Planet,
    physics: &PhysicsWorld,
    consumed: &mut ConsumedAngles,
    rng: &mut StdRng,
) -> Vec2 {
    find(planet, physics, consumed, LANDING_TOLERANCE, rng)
}

/// The flattest spot found for an object of `half_width` on the ground.
pub fn find_flat(
    planet: &Planet,
    physics: &PhysicsWorld,
    consumed: &mut ConsumedAngles,
    half_width: f32,
    rng: &mut StdRng,
) -> Vec2 {
    let tolerance = math::angular_half_width(half_width, planet.ground_height);
    find(planet, physics, consumed, tolerance, rng)
}

fn find(
    planet: &Planet,
    physics: &PhysicsWorld,
    consumed: &mut ConsumedAngles,
    tolerance: f32,
    rng: &mut StdRng,
) -> Vec2 {
    let mut best: Option<(f32, f32, Vec2)> = None;
    let mut last = 0.0;
    for _ in 0..TRIALS {
        let angle = rng.gen_range(-PI..PI);
        last = angle;
        if consumed.is_consumed(angle, tolerance) {
            continue;
        }
        let (score, local) = cast_at(planet, physics, angle);
        if best.map_or(true, |(s, _, _)| score < s) {
            best = Some((score, angle, local));
        }
    }
    let (angle, local) = match best {
        Some((_, angle, local)) => (angle, local),
        None => (last, cast_at(planet, physics, last).1),
    };
    consumed.add(angle, tolerance);
    local
}

/// Cast from the atmosphere edge toward the center at planet-local `angle`.
///
/// The score is how far the surface normal leans from the radial direction; a miss
/// scores worst and falls back to the nominal ground height.
fn cast_at(planet: &Planet, physics: &PhysicsWorld, angle: f32) -> (f32, Vec2) {
    let from = planet.to_world(math::from_angle_len(angle, planet.full_height()));
    match physics.cast_segment(from, planet.position(), CollisionGroup::ground_query()) {
        Some(hit) => {
            let radial = planet.angle() + angle;
            let score = math::angle_diff(math::angle_of(hit.normal), radial);
            (score, planet.to_local(hit.point))
        }
        None => (PI, math::from_angle_len(angle, planet.ground_height)),
    }
}
