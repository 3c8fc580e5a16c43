//! Sprite descriptors handed to the external renderer.

use bytemuck::{Pod, Zeroable};
use engine_core::{math, Transform2D, TransformRaw};
use glam::Vec2;
use std::ops::Range;

/// Draw order bucket, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrawLayer {
    Ground,
    Deco,
    Structures,
    Ships,
    Clouds,
}

/// A sprite placed relative to its owner's frame.
///
/// Planet-bound owners use a frame whose +Y points away from the planet center.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDesc {
    pub sprite: String,
    pub size: f32,
    pub rel_pos: Vec2,
    pub rel_angle: f32,
    /// Spin in rad/s.
    pub rotation_speed: f32,
    pub layer: DrawLayer,
    pub flipped: bool,
}

impl SpriteDesc {
    pub fn new(sprite: impl Into<String>, size: f32, layer: DrawLayer) -> Self {
        Self {
            sprite: sprite.into(),
            size,
            rel_pos: Vec2::ZERO,
            rel_angle: 0.0,
            rotation_speed: 0.0,
            layer,
            flipped: false,
        }
    }

    /// Distance from the owner's origin to the sprite's far edge.
    pub fn extent(&self) -> f32 {
        self.rel_pos.length() + self.size / 2.0
    }

    /// Advance the sprite's own spin.
    pub fn spin(&mut self, dt: f32) {
        if self.rotation_speed != 0.0 {
            self.rel_angle = math::norm_angle(self.rel_angle + self.rotation_speed * dt);
        }
    }

    /// Place the sprite in the world given its owner's frame.
    pub fn instance(&self, owner: &Transform2D) -> SpriteInstance {
        SpriteInstance {
            sprite: self.sprite.clone(),
            transform: owner.mul(&Transform2D::new(self.rel_pos, self.rel_angle)),
            size: self.size,
            layer: self.layer,
            flipped: self.flipped,
        }
    }
}

/// A fully positioned sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteInstance {
    pub sprite: String,
    pub transform: Transform2D,
    pub size: f32,
    pub layer: DrawLayer,
    pub flipped: bool,
}

impl SpriteInstance {
    pub fn raw(&self) -> SpriteRaw {
        SpriteRaw {
            model: TransformRaw::from_transform(&self.transform, self.size).model,
            layer: self.layer as u32,
            flipped: self.flipped as u32,
        }
    }
}

/// GPU instance data for one sprite.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpriteRaw {
    pub model: [[f32; 3]; 3],
    pub layer: u32,
    pub flipped: u32,
}

/// One frame of sprites sorted back to front, with the instance data to upload.
#[derive(Debug, Default)]
pub struct SpriteBatch {
    instances: Vec<SpriteInstance>,
    raw: Vec<SpriteRaw>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents. Order within a layer is kept.
    pub fn fill(&mut self, instances: impl IntoIterator<Item = SpriteInstance>) {
        self.instances.clear();
        self.instances.extend(instances);
        self.instances.sort_by_key(|i| i.layer);
        self.raw.clear();
        self.raw.extend(self.instances.iter().map(SpriteInstance::raw));
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instance buffer contents.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.raw)
    }

    /// Instance ranges sharing a layer, back to front.
    pub fn layer_ranges(&self) -> Vec<(DrawLayer, Range<usize>)> {
        let mut ranges: Vec<(DrawLayer, Range<usize>)> = Vec::new();
        for (i, instance) in self.instances.iter().enumerate() {
            match ranges.last_mut() {
                Some((layer, range)) if *layer == instance.layer => range.end = i + 1,
                _ => ranges.push((instance.layer, i..i + 1)),
            }
        }
        ranges
    }
}
