//! Mazes: round walled fortresses floating between the systems.
//!
//! The layout is a square grid clipped to its inscribed circle. Cells inside the circle
//! are mostly "inner" (walkable, walled); a smoothed noise field punches about a fifth
//! of them out as open holes. Walls sit on the right and bottom edge of each cell and
//! are knocked down afterwards until every cell can be reached from the corner.

use crate::config::MazeConfig;
use crate::placer::Region;
use glam::Vec2;
use rand::prelude::*;
use std::sync::Arc;

pub const MAX_MAZE_RADIUS: f32 = 40.0;
/// Extra clearance around a maze when placing it.
pub const MAZE_GAP: f32 = 10.0;
/// Ring between the maze grid and its outer radius where the outer garrison patrols.
pub const MAZE_BORDER: f32 = 4.0;
pub const MAZE_TILE_SIZE: f32 = 3.5;

const HOLE_PERCENTAGE: f32 = 0.2;
const WALL_PERCENTAGE: f64 = 0.5;

/// A placed maze, built lazily when the camera first comes near.
#[derive(Debug, Clone)]
pub struct Maze {
    pub config: Arc<MazeConfig>,
    pub position: Vec2,
    pub radius: f32,
    built: bool,
}

impl Maze {
    pub fn new(config: Arc<MazeConfig>, position: Vec2, radius: f32) -> Self {
        Self {
            config,
            position,
            radius,
            built: false,
        }
    }

    /// Occupied region; the placement gap is not part of it.
    pub fn region(&self) -> Region {
        Region::new(self.position, self.radius)
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Whether the camera is within `trigger` of the maze edge and it still needs building.
    pub fn should_build(&self, camera: Vec2, trigger: f32) -> bool {
        !self.built && camera.distance(self.position) < self.radius + trigger
    }

    pub fn mark_built(&mut self) {
        self.built = true;
    }

    /// Grid cells along one side.
    pub fn grid_size(&self) -> usize {
        let inner = (self.radius - MAZE_BORDER).max(0.0);
        (inner * 2.0 / MAZE_TILE_SIZE) as usize
    }
}

/// Generated wall layout, indexed `[col][row]` flattened column-major.
#[derive(Debug, Clone)]
pub struct MazeLayout {
    pub size: usize,
    inners: Vec<bool>,
    right: Vec<bool>,
    down: Vec<bool>,
}

impl MazeLayout {
    fn index(&self, col: usize, row: usize) -> usize {
        col * self.size + row
    }

    pub fn is_inner(&self, col: usize, row: usize) -> bool {
        col < self.size && row < self.size && self.inners[self.index(col, row)]
    }

    /// Wall between `(col, row)` and `(col + 1, row)`.
    pub fn right_wall(&self, col: usize, row: usize) -> bool {
        self.right[self.index(col, row)]
    }

    /// Wall between `(col, row)` and `(col, row + 1)`.
    pub fn down_wall(&self, col: usize, row: usize) -> bool {
        self.down[self.index(col, row)]
    }

    pub fn inner_count(&self) -> usize {
        self.inners.iter().filter(|i| **i).count()
    }

    /// Cells reachable from the corner without crossing a wall.
    pub fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.size * self.size];
        if self.size == 0 {
            return seen;
        }
        let mut stack = vec![(0usize, 0usize)];
        while let Some((col, row)) = stack.pop() {
            let i = self.index(col, row);
            if seen[i] {
                continue;
            }
            seen[i] = true;
            stack.extend(self.open_neighbours(col, row));
        }
        seen
    }

    fn open_neighbours(&self, col: usize, row: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(4);
        if col > 0 && !self.right_wall(col - 1, row) {
            out.push((col - 1, row));
        }
        if row > 0 && !self.down_wall(col, row - 1) {
            out.push((col, row - 1));
        }
        if col + 1 < self.size && !self.right_wall(col, row) {
            out.push((col + 1, row));
        }
        if row + 1 < self.size && !self.down_wall(col, row) {
            out.push((col, row + 1));
        }
        out
    }
}

pub struct MazeLayoutBuilder {
    size: usize,
}

impl MazeLayoutBuilder {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    pub fn build(&self, rng: &mut StdRng) -> MazeLayout {
        let n = self.size;
        let mut layout = MazeLayout {
            size: n,
            inners: self.inners(rng),
            right: vec![false; n * n],
            down: vec![false; n * n],
        };
        for col in 0..n {
            for row in 0..n {
                let inner = layout.is_inner(col, row);
                let right_inner = layout.is_inner(col + 1, row);
                let down_inner = layout.is_inner(col, row + 1);
                let i = layout.index(col, row);
                layout.right[i] = (inner || right_inner) && rng.gen_bool(WALL_PERCENTAGE);
                layout.down[i] = (inner || down_inner) && rng.gen_bool(WALL_PERCENTAGE);
            }
        }
        Self::make_all_accessible(&mut layout);
        layout
    }

    /// Knock down one wall per unreachable cell, joining it to an already reached
    /// neighbour, then flood from there.
    fn make_all_accessible(layout: &mut MazeLayout) {
        let n = layout.size;
        if n == 0 {
            return;
        }
        let mut steps = vec![0u32; n * n];
        Self::expand(layout, &mut steps, 0, 0, 0);
        for col in 0..n {
            for row in 0..n {
                if steps[layout.index(col, row)] != 0 {
                    continue;
                }
                let left_step = if col > 0 { steps[layout.index(col - 1, row)] } else { 0 };
                let up_step = if row > 0 { steps[layout.index(col, row - 1)] } else { 0 };
                let step = if left_step < up_step {
                    let i = layout.index(col, row - 1);
                    layout.down[i] = false;
                    up_step
                } else {
                    let i = layout.index(col - 1, row);
                    layout.right[i] = false;
                    left_step
                };
                Self::expand(layout, &mut steps, col, row, step);
            }
        }
    }

    fn expand(layout: &MazeLayout, steps: &mut [u32], col: usize, row: usize, prev_step: u32) {
        let mut stack = vec![(col, row, prev_step)];
        while let Some((col, row, prev)) = stack.pop() {
            let i = layout.index(col, row);
            if steps[i] > 0 {
                continue;
            }
            steps[i] = prev + 1;
            for (c, r) in layout.open_neighbours(col, row) {
                stack.push((c, r, prev + 1));
            }
        }
    }

    fn inners(&self, rng: &mut StdRng) -> Vec<bool> {
        let n = self.size;
        let mut values: Vec<f32> = (0..n * n).map(|_| rng.gen::<f32>()).collect();
        self.smooth(&mut values);
        self.smooth(&mut values);

        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if max - min > f32::EPSILON {
            let mul = 1.0 / (max - min);
            values.iter_mut().for_each(|v| *v = (*v - min) * mul);
        }

        // Pick the cutoff that lands closest to the wanted hole share.
        let total = (n * n).max(1) as f32;
        let cutoff = [HOLE_PERCENTAGE - 0.05, HOLE_PERCENTAGE, HOLE_PERCENTAGE + 0.05]
            .into_iter()
            .min_by(|a, b| {
                let share = |c: f32| values.iter().filter(|v| **v < c).count() as f32 / total;
                let da = (share(*a) - HOLE_PERCENTAGE).abs();
                let db = (share(*b) - HOLE_PERCENTAGE).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(HOLE_PERCENTAGE);

        (0..n * n)
            .map(|i| self.in_circle(i / n, i % n) && values[i] > cutoff)
            .collect()
    }

    /// Average with the four neighbours; cells beyond the edge count as 1.
    fn smooth(&self, values: &mut [f32]) {
        let n = self.size;
        for col in 0..n {
            for row in 0..n {
                let at = |c: usize, r: usize| values[c * n + r];
                let left = if col == 0 { 1.0 } else { at(col - 1, row) };
                let right = if col + 1 == n { 1.0 } else { at(col + 1, row) };
                let up = if row == 0 { 1.0 } else { at(col, row - 1) };
                let down = if row + 1 == n { 1.0 } else { at(col, row + 1) };
                let own = at(col, row);
                values[col * n + row] = (own + left + right + up + down) / 5.0;
            }
        }
    }

    fn in_circle(&self, col: usize, row: usize) -> bool {
        let half = (self.size / 2) as f32;
        let dc = col as f32 - half;
        let dr = row as f32 - half;
        (dc * dc + dr * dr).sqrt() < half
    }
}
