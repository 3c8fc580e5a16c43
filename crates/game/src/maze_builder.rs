//! Turns a maze layout into far wall tiles and a garrison.

use crate::object_manager::ObjectManager;
use crate::objects::{Anchor, FarObject, FarShip, MazeTile, Pilot, ShipState};
use engine_core::{math, Faction, Transform2D, Velocity};
use glam::Vec2;
use procgen::{HullConfig, Maze, MazeLayout, MazeLayoutBuilder, MAZE_BORDER, MAZE_TILE_SIZE};
use rand::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI};

/// Attempts at finding a free cell for one inner guard.
const FREE_CELL_TRIES: usize = 10;

/// Objects created for one maze.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MazeReport {
    pub tiles: usize,
    pub ships: usize,
}

pub struct MazeBuilder {
    size: usize,
    position: Vec2,
    angle: f32,
    inner_radius: f32,
    variants: usize,
}

impl MazeBuilder {
    pub fn new(maze: &Maze, variants: usize, rng: &mut StdRng) -> Self {
        Self {
            size: maze.grid_size(),
            position: maze.position,
            angle: rng.gen_range(-PI..PI),
            inner_radius: (maze.radius - MAZE_BORDER).max(0.0),
            variants: variants.max(1),
        }
    }

    pub fn build(&self, maze: &Maze, manager: &mut ObjectManager, rng: &mut StdRng) -> MazeReport {
        let layout = MazeLayoutBuilder::new(self.size).build(rng);
        let tiles = self.build_tiles(maze, &layout, manager, rng);
        let ships = self.build_enemies(maze, manager, rng);
        MazeReport { tiles, ships }
    }

    /// Center of a cell's edge, in world space.
    fn cell_pos(&self, col: usize, row: usize, offset: Vec2) -> Vec2 {
        let half = (self.size / 2) as f32;
        let local = Vec2::new(
            (col as f32 - half) * MAZE_TILE_SIZE,
            (row as f32 - half) * MAZE_TILE_SIZE,
        ) + offset;
        self.position + math::rotate(local, self.angle)
    }

    fn build_tiles(
        &self,
        maze: &Maze,
        layout: &MazeLayout,
        manager: &mut ObjectManager,
        rng: &mut StdRng,
    ) -> usize {
        let mut count = 0;
        for col in 0..self.size {
            for row in 0..self.size {
                let own = layout.is_inner(col, row);

                let right = layout.is_inner(col + 1, row);
                if own || right {
                    let tile = self.tile(
                        maze,
                        layout.right_wall(col, row),
                        own && right,
                        if own { self.angle - FRAC_PI_2 } else { self.angle + FRAC_PI_2 },
                        self.cell_pos(col, row, Vec2::new(MAZE_TILE_SIZE / 2.0, 0.0)),
                        rng,
                    );
                    manager.add_far_now(FarObject::MazeTile(tile));
                    count += 1;
                }

                let down = layout.is_inner(col, row + 1);
                if own || down {
                    let tile = self.tile(
                        maze,
                        layout.down_wall(col, row),
                        own && down,
                        if own { self.angle } else { self.angle + PI },
                        self.cell_pos(col, row, Vec2::new(0.0, MAZE_TILE_SIZE / 2.0)),
                        rng,
                    );
                    manager.add_far_now(FarObject::MazeTile(tile));
                    count += 1;
                }
            }
        }
        count
    }

    /// Border tiles face away from their walkable side.
    fn tile(
        &self,
        maze: &Maze,
        wall: bool,
        inner: bool,
        angle: f32,
        position: Vec2,
        rng: &mut StdRng,
    ) -> MazeTile {
        let kind = if wall { "wall" } else { "pass" };
        let side = if inner { "inner" } else { "border" };
        MazeTile {
            sprite: format!(
                "{}_{}_{}_{}",
                maze.config.tile_set,
                side,
                kind,
                rng.gen_range(0..self.variants)
            ),
            wall,
            inner,
            transform: Transform2D::new(position, math::norm_angle(angle)),
            flipped: rng.gen_bool(0.5),
        }
    }

    fn build_enemies(&self, maze: &Maze, manager: &mut ObjectManager, rng: &mut StdRng) -> usize {
        let mut count = 0;
        let ring = maze.radius - MAZE_BORDER / 2.0;
        let circumference = std::f32::consts::TAU * ring;
        for template in &maze.config.outer_enemies {
            for _ in 0..(template.density * circumference) as usize {
                let pos = self.position + math::from_angle_len(rng.gen_range(-PI..PI), ring);
                manager.add_far_now(guard(&template.hull, pos, rng));
                count += 1;
            }
        }

        if self.size > 0 {
            let mut occupied = vec![false; self.size * self.size];
            let center = self.size / 2;
            occupied[center * self.size + center] = true;
            let area = PI * self.inner_radius * self.inner_radius;
            for template in &maze.config.inner_enemies {
                for _ in 0..(template.density * area) as usize {
                    if let Some(pos) = self.free_cell(&mut occupied, rng) {
                        manager.add_far_now(guard(&template.hull, pos, rng));
                        count += 1;
                    }
                }
            }
        }

        if let Some(boss) = maze.config.bosses.choose(rng) {
            let center = self.size / 2;
            let pos = self.cell_pos(center, center, Vec2::ZERO);
            manager.add_far_now(guard(boss, pos, rng));
            count += 1;
        }
        count
    }

    fn free_cell(&self, occupied: &mut [bool], rng: &mut StdRng) -> Option<Vec2> {
        for _ in 0..FREE_CELL_TRIES {
            let col = rng.gen_range(0..self.size);
            let row = rng.gen_range(0..self.size);
            let i = col * self.size + row;
            if occupied[i] {
                continue;
            }
            let pos = self.cell_pos(col, row, Vec2::ZERO);
            if pos.distance(self.position) > 0.8 * self.inner_radius {
                continue;
            }
            occupied[i] = true;
            return Some(pos);
        }
        None
    }
}

fn guard(hull: &HullConfig, position: Vec2, rng: &mut StdRng) -> FarObject {
    let pilot = Pilot::StillGuard(Anchor::Fixed { position });
    FarObject::Ship(FarShip::new(
        ShipState::new(hull.clone(), Faction::Hostile, pilot),
        Transform2D::new(position, rng.gen_range(-PI..PI)),
        Velocity::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_manager::StreamingConfig;
    use crate::objects::ObjectKind;
    use procgen::MazeConfig;
    use std::sync::Arc;

    fn build(seed: u64) -> (Maze, ObjectManager, MazeReport) {
        let maze = Maze::new(Arc::new(MazeConfig::default()), Vec2::new(300.0, -200.0), 36.0);
        let mut manager = ObjectManager::new(StreamingConfig::new(24.0, 0.33));
        let mut rng = StdRng::seed_from_u64(seed);
        let report = MazeBuilder::new(&maze, 2, &mut rng).build(&maze, &mut manager, &mut rng);
        (maze, manager, report)
    }

    #[test]
    fn everything_starts_far() {
        let (_, manager, report) = build(1);
        assert_eq!(manager.near_count(), 0);
        assert_eq!(manager.far_count(), report.tiles + report.ships);
        assert!(report.tiles > 0);
    }

    #[test]
    fn tiles_stay_inside_the_maze() {
        let (maze, manager, _) = build(2);
        for (_, object) in manager.far_objects() {
            if object.kind() == ObjectKind::MazeTile {
                assert!(object.position().distance(maze.position) < maze.radius);
            }
        }
    }

    #[test]
    fn garrison_has_outer_ring_and_boss() {
        let (maze, manager, _) = build(3);
        let ships: Vec<&FarShip> = manager.far_objects().filter_map(|(_, o)| o.as_ship()).collect();
        let ring = maze.radius - MAZE_BORDER / 2.0;
        let outer = ships
            .iter()
            .filter(|s| (s.transform.position.distance(maze.position) - ring).abs() < 1e-3)
            .count();
        assert_eq!(outer, (0.05 * std::f32::consts::TAU * ring) as usize);
        assert!(ships.iter().any(|s| s.state.hull.name == "warden"));
        assert!(ships
            .iter()
            .all(|s| matches!(s.state.pilot, Pilot::StillGuard(Anchor::Fixed { .. }))));
    }
}
