//! Non-overlapping placement of circular regions on the open plane.

use crate::error::GenError;
use engine_core::math;
use glam::Vec2;
use rand::prelude::*;
use std::f32::consts::PI;

/// Candidate angles tried per sweep.
const TRIALS_PER_SWEEP: usize = 20;

/// A placed circle: a star system or a maze.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub center: Vec2,
    pub radius: f32,
}

impl Region {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.center.distance(other.center) < self.radius + other.radius
    }
}

/// Expanding-ring search for free space.
///
/// Sweeps a half circle at a growing distance from the origin, so the galaxy stays
/// compact around the first region.
#[derive(Debug, Clone, Copy)]
pub struct SpatialPlacer {
    /// Growth of the search distance after a failed sweep.
    pub step: f32,
    pub max_sweeps: u32,
}

impl SpatialPlacer {
    pub fn new(step: f32, max_sweeps: u32) -> Self {
        Self { step, max_sweeps }
    }

    /// Find a center for a region of `radius` that overlaps none of `existing`.
    pub fn place(
        &self,
        existing: &[Region],
        radius: f32,
        rng: &mut StdRng,
    ) -> Result<Vec2, GenError> {
        let mut dist = 0.0;
        for _ in 0..self.max_sweeps {
            for _ in 0..TRIALS_PER_SWEEP {
                let angle = rng.gen_range(0.0..PI);
                let candidate = math::from_angle_len(angle, dist);
                let free = existing
                    .iter()
                    .all(|r| r.center.distance(candidate) >= r.radius + radius);
                if free {
                    return Ok(candidate);
                }
            }
            dist += self.step;
        }
        Err(GenError::PlacementExhausted {
            radius,
            sweeps: self.max_sweeps,
        })
    }
}
