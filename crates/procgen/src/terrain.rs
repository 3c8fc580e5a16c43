//! Planet ground generation: a closed ring of tile columns carved from a smoothed
//! random depth profile.
//!
//! Rows count inward from the surface: row 0 is the outermost ring. Each column gets a
//! depth boundary; cells above it are sky, the boundary row carries the surface, and
//! everything below is buried ground. Neighbouring columns wrap around, so the last
//! column meets the first one.

use crate::config::PlanetConfig;
use crate::error::GenError;
use crate::tiles::{SurfaceDirection, Tile, TileTable};
use rand::prelude::*;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Fraction of rows that always stay undifferentiated ground.
pub const DEFAULT_PURITY: f32 = 0.333;
/// Arc length of a tile in the outermost row.
pub const TOP_TILE_SIZE: f32 = 2.0;
/// Keeps the rescaled maximum from truncating into the next row.
const RESCALE_MARGIN: f32 = 0.01;
/// Number of tunnel seeds spread around the ring.
const TUNNEL_NODES: usize = 3;

/// Knobs the ground builder reads from a planet config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundConfig {
    pub purity: f32,
    pub smooth: bool,
    pub carve_tunnels: bool,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            purity: DEFAULT_PURITY,
            smooth: true,
            carve_tunnels: false,
        }
    }
}

impl From<&PlanetConfig> for GroundConfig {
    fn from(config: &PlanetConfig) -> Self {
        Self {
            purity: DEFAULT_PURITY,
            smooth: config.smooth_landscape,
            carve_tunnels: config.carve_tunnels,
        }
    }
}

/// Blend every value with its two neighbours on a circular domain.
pub fn smooth_circular(raw: &[f32]) -> Vec<f32> {
    let n = raw.len();
    (0..n)
        .map(|i| {
            let prev = raw[(i + n - 1) % n];
            let next = raw[(i + 1) % n];
            0.25 * (prev + next) + 0.5 * raw[i]
        })
        .collect()
}

/// Stretch `values` so they span exactly `[desired_min, desired_max - margin]`.
/// Flat input collapses onto `desired_min`.
pub fn rescale(values: &mut [f32], desired_min: f32, desired_max: f32) {
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = max - min;
    if !span.is_finite() || span <= f32::EPSILON {
        values.iter_mut().for_each(|v| *v = desired_min);
        return;
    }
    let mul = (desired_max - RESCALE_MARGIN - desired_min) / span;
    for v in values.iter_mut() {
        *v = desired_min + (*v - min) * mul;
    }
}

/// Direction of the surface on an edge whose column has boundary `depth`.
#[inline]
pub fn classify(row: usize, depth: usize) -> SurfaceDirection {
    if row < depth {
        SurfaceDirection::Down
    } else if row > depth {
        SurfaceDirection::Up
    } else {
        SurfaceDirection::Forward
    }
}

/// Radii and tile sizes of a planet's ground rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RingLayout {
    pub columns: usize,
    /// Center radius of every row, outermost first.
    pub radii: Vec<f32>,
    /// Tile size of every row: the arc length per column at that radius.
    pub tile_sizes: Vec<f32>,
    /// Innermost radius reached by the ground.
    pub min_radius: f32,
}

impl RingLayout {
    pub fn new(ground_height: f32, rows: usize) -> Result<Self, GenError> {
        let invalid = GenError::InvalidGround {
            ground_height,
            rows,
        };
        let outer = ground_height - TOP_TILE_SIZE / 2.0;
        let columns = (TAU * outer / TOP_TILE_SIZE).max(0.0) as usize;
        if columns == 0 || rows == 0 {
            return Err(invalid);
        }

        let mut radii = Vec::with_capacity(rows);
        let mut tile_sizes = Vec::with_capacity(rows);
        let mut radius = outer;
        for _ in 0..rows {
            let size = TAU * radius / columns as f32;
            radii.push(radius);
            tile_sizes.push(size);
            radius -= size;
        }
        let min_radius = radii[rows - 1] - tile_sizes[rows - 1] / 2.0;

        Ok(Self {
            columns,
            radii,
            tile_sizes,
            min_radius,
        })
    }

    pub fn rows(&self) -> usize {
        self.radii.len()
    }

    /// Planet-relative angle of a column.
    pub fn column_angle(&self, col: usize) -> f32 {
        TAU * col as f32 / self.columns as f32
    }
}

/// Generated ground: a `columns x rows` grid of optional tiles.
#[derive(Debug, Clone)]
pub struct GroundMap {
    columns: usize,
    rows: usize,
    depths: Vec<usize>,
    classes: Vec<Option<(SurfaceDirection, SurfaceDirection)>>,
    cells: Vec<Option<Arc<Tile>>>,
}

impl GroundMap {
    fn index(&self, col: usize, row: usize) -> usize {
        col * self.rows + row
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Depth boundary of a column.
    pub fn depth(&self, col: usize) -> usize {
        self.depths[col]
    }

    pub fn tile(&self, col: usize, row: usize) -> Option<&Arc<Tile>> {
        self.cells.get(self.index(col, row))?.as_ref()
    }

    /// `(from, to)` classification of a cell; `None` for sky.
    pub fn class(&self, col: usize, row: usize) -> Option<(SurfaceDirection, SurfaceDirection)> {
        self.classes.get(self.index(col, row)).copied().flatten()
    }

    /// Whether a cell is buried ground on both edges.
    pub fn is_ground(&self, col: usize, row: usize) -> bool {
        self.class(col, row) == Some((SurfaceDirection::Up, SurfaceDirection::Up))
    }

    /// Fraction of all cells classified as pure ground.
    pub fn pure_ground_fraction(&self) -> f32 {
        let total = self.columns * self.rows;
        if total == 0 {
            return 0.0;
        }
        let pure = (0..self.columns)
            .flat_map(|c| (0..self.rows).map(move |r| (c, r)))
            .filter(|&(c, r)| self.is_ground(c, r))
            .count();
        pure as f32 / total as f32
    }

    /// Every placed tile with its cell.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, &Arc<Tile>)> {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref().map(|tile| (i / self.rows, i % self.rows, tile))
        })
    }

    fn left(&self, col: usize) -> usize {
        (col + self.columns - 1) % self.columns
    }

    fn right(&self, col: usize) -> usize {
        (col + 1) % self.columns
    }
}

/// Builds one planet's ground map.
pub struct GroundBuilder<'a> {
    config: GroundConfig,
    tiles: &'a TileTable,
    columns: usize,
    rows: usize,
}

impl<'a> GroundBuilder<'a> {
    pub fn new(config: GroundConfig, tiles: &'a TileTable, columns: usize, rows: usize) -> Self {
        Self {
            config,
            tiles,
            columns,
            rows,
        }
    }

    /// Raw depth samples followed by the optional smoothing and rescale pass.
    pub fn depth_profile(&self, rng: &mut StdRng) -> Vec<f32> {
        let desired_min = 0.0;
        let desired_max = (1.0 - self.config.purity) * self.rows as f32;
        let raw: Vec<f32> = (0..self.columns)
            .map(|_| desired_min + rng.gen::<f32>() * (desired_max - desired_min))
            .collect();
        if !self.config.smooth {
            return raw;
        }
        let mut smoothed = smooth_circular(&raw);
        rescale(&mut smoothed, desired_min, desired_max);
        smoothed
    }

    pub fn build(&self, rng: &mut StdRng) -> GroundMap {
        let depths: Vec<usize> = self
            .depth_profile(rng)
            .into_iter()
            .map(|d| d.max(0.0) as usize)
            .collect();

        let cell_count = self.columns * self.rows;
        let mut map = GroundMap {
            columns: self.columns,
            rows: self.rows,
            depths,
            classes: vec![None; cell_count],
            cells: vec![None; cell_count],
        };

        for col in 0..self.columns {
            let prev = map.depths[map.left(col)];
            let own = map.depths[col];
            for row in 0..self.rows {
                let from = classify(row, prev);
                let to = classify(row, own);
                if from == SurfaceDirection::Down && to == SurfaceDirection::Down {
                    continue;
                }
                let i = map.index(col, row);
                map.classes[i] = Some((from, to));
                map.cells[i] = self.tiles.ground(from, to, rng);
            }
        }

        if self.config.carve_tunnels && self.columns > 0 && self.rows > 0 {
            self.carve_tunnels(&mut map, rng);
        }
        map
    }

    fn carve_tunnels(&self, map: &mut GroundMap, rng: &mut StdRng) {
        let mut dungeon = vec![false; map.columns * map.rows];
        let deep_band = ((self.config.purity * self.rows as f32) / 2.0) as usize;
        for i in 0..TUNNEL_NODES {
            let col = map.columns * i / TUNNEL_NODES;
            let row = (self.rows - 1).saturating_sub(rng.gen_range(0..=deep_band));
            self.tunnel(map, &mut dungeon, col, row, true, rng);
            self.tunnel(map, &mut dungeon, col, row, false, rng);
        }

        for col in 0..map.columns {
            for row in 0..map.rows {
                let i = map.index(col, row);
                if !dungeon[i] {
                    continue;
                }
                map.cells[i] = if map.is_ground(col, row) {
                    None
                } else {
                    let down = row + 1 < map.rows && map.is_ground(col, row + 1);
                    let left = map.is_ground(map.left(col), row);
                    let right = map.is_ground(map.right(col), row);
                    self.tiles.dungeon_entrance(down, left, right, rng)
                };
            }
        }
        log::debug!(
            "Carved {} tunnel cells into a {}x{} ring",
            dungeon.iter().filter(|d| **d).count(),
            map.columns,
            map.rows
        );
    }

    /// Walk sideways from a seed, climbing a row per unit of accumulated spacing,
    /// until the walk leaves pure ground.
    fn tunnel(
        &self,
        map: &GroundMap,
        dungeon: &mut [bool],
        mut col: usize,
        mut row: usize,
        to_left: bool,
        rng: &mut StdRng,
    ) {
        let mut visit = |col: usize, row: usize| {
            dungeon[map.index(col, row)] = true;
            !map.is_ground(col, row)
        };

        visit(col, row);
        let mut spacing = 0.0f32;
        loop {
            col = if to_left { map.left(col) } else { map.right(col) };
            let max_step = if rng.gen_bool(0.3) { 4.0 } else { 1.0 };
            spacing += rng.gen_range(0.5..max_step);
            if visit(col, row) {
                return;
            }
            while spacing > 0.0 {
                spacing -= 1.0;
                if row == 0 {
                    return;
                }
                row -= 1;
                if visit(col, row) {
                    return;
                }
            }
        }
    }
}
