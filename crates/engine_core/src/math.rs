//! Planar angle helpers.
//!
//! All angles are radians, counter-clockwise from +X. Planet-relative code leans on
//! these heavily: positions on a ring are expressed as (angle, distance) pairs and
//! re-projected every tick as the planet turns.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Point at `len` along the direction `angle`.
#[inline]
pub fn from_angle_len(angle: f32, len: f32) -> Vec2 {
    Vec2::new(angle.cos() * len, angle.sin() * len)
}

/// Direction of `v`. Zero vectors report 0.
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    if v == Vec2::ZERO {
        0.0
    } else {
        v.y.atan2(v.x)
    }
}

/// Rotate `v` counter-clockwise by `angle`.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Wrap an angle into `(-PI, PI]`.
pub fn norm_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Smallest absolute difference between two angles, in `[0, PI]`.
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    norm_angle(a - b).abs()
}

/// Angle subtended by an arc of length `arc` at `radius`.
#[inline]
pub fn arc_to_angle(arc: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        0.0
    } else {
        arc / radius
    }
}

/// Half of the angle a circle of `radius` occupies when seen from `dist` away.
/// Circles that swallow the viewpoint occupy a half turn.
pub fn angular_half_width(radius: f32, dist: f32) -> f32 {
    if dist <= radius {
        return PI / 2.0;
    }
    (radius / dist).asin()
}

/// Center of the window of size `window` that contains `value`.
#[inline]
pub fn window_center(value: f32, window: f32) -> f32 {
    (value / window).floor() * window + window / 2.0
}

/// Index of the window of size `window` that contains `value`.
#[inline]
pub fn window_index(value: f32, window: f32) -> i32 {
    (value / window).floor() as i32
}
