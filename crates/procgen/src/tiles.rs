//! Ground tile descriptors and the per-tile-set lookup table.
//!
//! A tile is a unit square in tile-local space (x along the ring, y pointing away from
//! the planet center). Its outline follows the ground surface from the left edge to the
//! right edge; `from` and `to` say where the surface sits on each edge.

use glam::Vec2;
use rand::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Where the ground surface sits on one edge of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceDirection {
    /// The edge is fully inside the ground.
    Up,
    /// The edge is fully above the ground.
    Down,
    /// The surface crosses the edge at mid height.
    Forward,
}

impl SurfaceDirection {
    pub const ALL: [SurfaceDirection; 3] = [Self::Up, Self::Down, Self::Forward];

    /// Height of the surface on an edge with this direction, in tile-local units.
    pub fn edge_height(self) -> f32 {
        match self {
            Self::Up => 0.5,
            Self::Down => -0.5,
            Self::Forward => 0.0,
        }
    }

    fn letter(self) -> char {
        match self {
            Self::Up => 'u',
            Self::Down => 'd',
            Self::Forward => 'f',
        }
    }
}

/// Immutable terrain piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub sprite: String,
    /// Collision outline in tile-local unit space. Empty means no collision.
    pub points: Vec<Vec2>,
    pub from: SurfaceDirection,
    pub to: SurfaceDirection,
}

impl Tile {
    pub fn has_collision(&self) -> bool {
        !self.points.is_empty()
    }

    /// Undifferentiated ground, fully buried on both edges.
    pub fn is_pure_ground(&self) -> bool {
        self.from == SurfaceDirection::Up && self.to == SurfaceDirection::Up
    }
}

/// Outline of a ground tile: bottom edge plus the surface from left to right.
/// Buried tiles need no outline since the surface row above them blocks everything.
fn ground_outline(from: SurfaceDirection, to: SurfaceDirection) -> Vec<Vec2> {
    if from == SurfaceDirection::Up && to == SurfaceDirection::Up {
        return Vec::new();
    }
    let mut points = vec![
        Vec2::new(-0.5, -0.5),
        Vec2::new(0.5, -0.5),
        Vec2::new(0.5, to.edge_height()),
        Vec2::new(-0.5, from.edge_height()),
    ];
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Lookup table of ground tiles keyed by `(from, to)`, with random variant choice.
#[derive(Debug, Clone)]
pub struct TileTable {
    name: String,
    ground: HashMap<(SurfaceDirection, SurfaceDirection), Vec<Arc<Tile>>>,
    entrances: Vec<Arc<Tile>>,
}

impl TileTable {
    /// Build the table for a tile set with `variants` sprites per transition.
    ///
    /// The `(Down, Down)` transition is pure sky and has no entry.
    pub fn generate(name: &str, variants: usize) -> Self {
        let mut ground = HashMap::new();
        for from in SurfaceDirection::ALL {
            for to in SurfaceDirection::ALL {
                if from == SurfaceDirection::Down && to == SurfaceDirection::Down {
                    continue;
                }
                let tiles = (0..variants)
                    .map(|v| {
                        Arc::new(Tile {
                            sprite: format!("{}_{}{}_{}", name, from.letter(), to.letter(), v),
                            points: ground_outline(from, to),
                            from,
                            to,
                        })
                    })
                    .collect();
                ground.insert((from, to), tiles);
            }
        }

        let entrances = (0..variants)
            .map(|v| {
                Arc::new(Tile {
                    sprite: format!("{}_entrance_{}", name, v),
                    points: vec![
                        Vec2::new(-0.5, -0.5),
                        Vec2::new(0.5, -0.5),
                        Vec2::new(0.5, -0.25),
                        Vec2::new(-0.5, -0.25),
                    ],
                    from: SurfaceDirection::Forward,
                    to: SurfaceDirection::Forward,
                })
            })
            .collect();

        Self {
            name: name.to_string(),
            ground,
            entrances,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Random ground tile for a transition. Missing variants yield `None`.
    pub fn ground(
        &self,
        from: SurfaceDirection,
        to: SurfaceDirection,
        rng: &mut StdRng,
    ) -> Option<Arc<Tile>> {
        self.ground.get(&(from, to))?.choose(rng).cloned()
    }

    /// Tile marking where a tunnel breaks through the surface.
    ///
    /// Only tunnels with ground below them get a floor; open shafts have no tile.
    pub fn dungeon_entrance(
        &self,
        down: bool,
        _left: bool,
        _right: bool,
        rng: &mut StdRng,
    ) -> Option<Arc<Tile>> {
        if !down {
            return None;
        }
        self.entrances.choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_transition_has_no_entry() {
        let table = TileTable::generate("rocky", 2);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(table
            .ground(SurfaceDirection::Down, SurfaceDirection::Down, &mut rng)
            .is_none());
        let flat = table
            .ground(SurfaceDirection::Forward, SurfaceDirection::Forward, &mut rng)
            .unwrap();
        assert_eq!(flat.points.len(), 4);
    }

    #[test]
    fn buried_tiles_have_no_outline() {
        let table = TileTable::generate("rocky", 1);
        let mut rng = StdRng::seed_from_u64(1);
        let tile = table
            .ground(SurfaceDirection::Up, SurfaceDirection::Up, &mut rng)
            .unwrap();
        assert!(tile.is_pure_ground());
        assert!(!tile.has_collision());
    }

    #[test]
    fn slope_outline_collapses_to_triangle() {
        let points = ground_outline(SurfaceDirection::Down, SurfaceDirection::Up);
        assert_eq!(points.len(), 3);
        assert!(points.contains(&Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn empty_table_yields_sparse_lookups() {
        let table = TileTable::generate("bare", 0);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(table
            .ground(SurfaceDirection::Forward, SurfaceDirection::Up, &mut rng)
            .is_none());
        assert!(table.dungeon_entrance(true, true, true, &mut rng).is_none());
    }
}
