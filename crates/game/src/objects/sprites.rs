//! Decorative sprite packs bound to a planet: clouds and ground deco.

use super::{planet_frame, UpdateContext};
use crate::drawables::{SpriteDesc, SpriteInstance};
use engine_core::{math, Transform2D};
use procgen::Planet;

/// Sprites sharing one planet-bound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetSprites {
    pub planet: usize,
    pub angle_rel: f32,
    pub dist: f32,
    /// Drift along the surface in rad/s. Clouds drift, deco does not.
    pub drift_speed: f32,
    pub sprites: Vec<SpriteDesc>,
    pub transform: Transform2D,
    radius: f32,
}

impl PlanetSprites {
    pub fn new(
        planet_index: usize,
        planet: &Planet,
        angle_rel: f32,
        dist: f32,
        drift_speed: f32,
        sprites: Vec<SpriteDesc>,
    ) -> Self {
        let radius = sprites.iter().map(SpriteDesc::extent).fold(0.0, f32::max);
        Self {
            planet: planet_index,
            angle_rel,
            dist,
            drift_speed,
            sprites,
            transform: planet_frame(planet, angle_rel, dist),
            radius,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn update(&mut self, ctx: &UpdateContext<'_>) {
        self.angle_rel = math::norm_angle(self.angle_rel + self.drift_speed * ctx.dt);
        if let Some(p) = ctx.planets.get(self.planet) {
            self.transform = planet_frame(p, self.angle_rel, self.dist);
        }
    }
}

/// Visible pack; sprites spin only while near.
#[derive(Debug)]
pub struct NearSprites {
    pub sprites: PlanetSprites,
}

impl NearSprites {
    pub fn update(&mut self, ctx: &UpdateContext<'_>) {
        self.sprites.update(ctx);
        for sprite in &mut self.sprites.sprites {
            sprite.spin(ctx.dt);
        }
    }

    pub fn collect_sprites(&self, out: &mut Vec<SpriteInstance>) {
        let frame = self.sprites.transform;
        out.extend(self.sprites.sprites.iter().map(|s| s.instance(&frame)));
    }
}
