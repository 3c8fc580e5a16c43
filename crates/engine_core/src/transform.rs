//! Transform component and utilities for planar positioning.

use crate::math;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Vec2};

/// A 2D transform: position plus counter-clockwise rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub angle: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            angle: 0.0,
        }
    }
}

impl Transform2D {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    /// Create the model matrix for this transform, scaled uniformly by `scale`.
    pub fn to_matrix(&self, scale: f32) -> Mat3 {
        Mat3::from_scale_angle_translation(Vec2::splat(scale), self.angle, self.position)
    }

    /// Local +X axis in world space.
    pub fn right(&self) -> Vec2 {
        math::from_angle_len(self.angle, 1.0)
    }

    /// Local +Y axis in world space.
    pub fn up(&self) -> Vec2 {
        math::from_angle_len(self.angle + std::f32::consts::FRAC_PI_2, 1.0)
    }

    /// Map a point from local space into world space.
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + math::rotate(local, self.angle)
    }

    /// Compose: `local` expressed relative to `self`.
    pub fn mul(&self, local: &Transform2D) -> Transform2D {
        Transform2D {
            position: self.transform_point(local.position),
            angle: self.angle + local.angle,
        }
    }
}

/// Raw transform data for GPU upload (instance data).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRaw {
    pub model: [[f32; 3]; 3],
}

impl TransformRaw {
    pub fn from_transform(transform: &Transform2D, scale: f32) -> Self {
        Self {
            model: transform.to_matrix(scale).to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn compose_applies_parent_rotation_to_child_offset() {
        let parent = Transform2D::new(Vec2::new(10.0, 0.0), FRAC_PI_2);
        let child = Transform2D::new(Vec2::new(1.0, 0.0), 0.0);
        let world = parent.mul(&child);
        assert!((world.position - Vec2::new(10.0, 1.0)).length() < 1e-5);
        assert!((world.angle - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn raw_matrix_carries_translation() {
        let raw = TransformRaw::from_transform(&Transform2D::from_position(Vec2::new(3.0, 4.0)), 1.0);
        assert_eq!(raw.model[2][0], 3.0);
        assert_eq!(raw.model[2][1], 4.0);
    }
}
