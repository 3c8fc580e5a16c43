//! Galaxy generation: star systems and mazes interleaved on one occupancy list.

use crate::config::{BeltConfig, GalaxyConfig, MazeConfig, PlanetConfig, SystemConfig};
use crate::error::GenError;
use crate::maze::{Maze, MAX_MAZE_RADIUS, MAZE_GAP};
use crate::placer::{Region, SpatialPlacer};
use crate::planet::Planet;
use crate::star_system::{
    build_system, orbit_slots, system_radius, SolarSystem, SystemBelt, SystemSpec,
    STAR_ZONE_RADIUS,
};
use glam::Vec2;
use rand::prelude::*;
use std::sync::Arc;

/// The whole generated world layout.
#[derive(Debug, Clone)]
pub struct Galaxy {
    pub systems: Vec<SolarSystem>,
    pub planets: Vec<Planet>,
    pub belts: Vec<SystemBelt>,
    pub mazes: Vec<Maze>,
}

impl Galaxy {
    /// Generate systems and mazes in random interleaved order. The first entity is
    /// always a system, and it is the only easy one.
    pub fn generate(config: &GalaxyConfig, rng: &mut StdRng) -> Result<Self, GenError> {
        if config.system_count > 0 && config.systems.is_empty() {
            return Err(GenError::EmptyConfig("systems"));
        }
        if config.maze_count > 0 && config.mazes.is_empty() {
            return Err(GenError::EmptyConfig("mazes"));
        }
        if config.system_count > 0 && config.planets.is_empty() {
            return Err(GenError::EmptyConfig("planets"));
        }

        let planet_configs: Vec<Arc<PlanetConfig>> =
            config.planets.iter().cloned().map(Arc::new).collect();
        let system_configs: Vec<Arc<SystemConfig>> =
            config.systems.iter().cloned().map(Arc::new).collect();
        let maze_configs: Vec<Arc<MazeConfig>> =
            config.mazes.iter().cloned().map(Arc::new).collect();
        let belt_configs: Vec<Arc<BeltConfig>> =
            config.belts.iter().cloned().map(Arc::new).collect();

        let placer = SpatialPlacer::new(STAR_ZONE_RADIUS, config.max_sweeps);
        let mut galaxy = Galaxy {
            systems: Vec::new(),
            planets: Vec::new(),
            belts: Vec::new(),
            mazes: Vec::new(),
        };
        let mut occupied: Vec<Region> = Vec::new();
        let mut systems_left = config.system_count;
        let mut mazes_left = config.maze_count;

        while systems_left > 0 || mazes_left > 0 {
            let mut create_system = systems_left > 0;
            if create_system && mazes_left > 0 && !galaxy.systems.is_empty() {
                create_system = rng.gen_bool(0.5);
            }

            if create_system {
                let slots = orbit_slots(config.planets_per_system, !belt_configs.is_empty(), rng);
                let radius = system_radius(&slots);
                let position = placer.place(&occupied, radius, rng)?;
                let first = galaxy.systems.is_empty();
                let hard = !first;
                let index = galaxy.systems.len();
                let spec = SystemSpec {
                    index,
                    name: config
                        .system_names
                        .choose(rng)
                        .cloned()
                        .unwrap_or_else(|| format!("System {}", index + 1)),
                    position,
                    slots: &slots,
                    config: pick_system_config(&system_configs, hard, rng)?,
                    hard,
                    first_planet: galaxy.planets.len(),
                    first_belt: galaxy.belts.len(),
                };
                let parts = build_system(
                    spec,
                    &planet_configs,
                    &belt_configs,
                    &config.planet_names,
                    rng,
                )?;
                occupied.push(parts.system.region());
                galaxy.planets.extend(parts.planets);
                galaxy.belts.extend(parts.belts);
                galaxy.systems.push(parts.system);
                systems_left -= 1;
            } else {
                let maze_config = maze_configs
                    .choose(rng)
                    .cloned()
                    .ok_or(GenError::EmptyConfig("mazes"))?;
                let radius = rng.gen_range(0.7..1.0) * MAX_MAZE_RADIUS;
                let position = placer.place(&occupied, radius + MAZE_GAP, rng)?;
                let maze = Maze::new(maze_config, position, radius);
                occupied.push(maze.region());
                galaxy.mazes.push(maze);
                mazes_left -= 1;
            }
        }

        log::info!(
            "Generated galaxy: {} systems, {} planets, {} belts, {} mazes",
            galaxy.systems.len(),
            galaxy.planets.len(),
            galaxy.belts.len(),
            galaxy.mazes.len()
        );
        Ok(galaxy)
    }

    /// Regions of every system and maze.
    pub fn regions(&self) -> Vec<Region> {
        self.systems
            .iter()
            .map(SolarSystem::region)
            .chain(self.mazes.iter().map(Maze::region))
            .collect()
    }

    /// Index of the planet whose center is closest to `pos`.
    pub fn nearest_planet(&self, pos: Vec2) -> Option<usize> {
        nearest(self.planets.iter().map(Planet::position), pos)
    }

    /// Index of the belt whose ring contains `pos`.
    pub fn belt_at(&self, pos: Vec2) -> Option<usize> {
        self.belts.iter().position(|b| b.contains(pos))
    }

    /// Index of the system whose star is closest to `pos`.
    pub fn nearest_system(&self, pos: Vec2) -> Option<usize> {
        nearest(self.systems.iter().map(|s| s.position), pos)
    }
}

fn nearest(points: impl Iterator<Item = Vec2>, pos: Vec2) -> Option<usize> {
    points
        .enumerate()
        .map(|(i, p)| (i, p.distance_squared(pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn pick_system_config(
    configs: &[Arc<SystemConfig>],
    hard: bool,
    rng: &mut StdRng,
) -> Result<Arc<SystemConfig>, GenError> {
    let matching: Vec<&Arc<SystemConfig>> = configs.iter().filter(|c| c.hard == hard).collect();
    matching
        .choose(rng)
        .map(|c| Arc::clone(c))
        .or_else(|| configs.choose(rng).cloned())
        .ok_or(GenError::EmptyConfig("systems"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64) -> Galaxy {
        Galaxy::generate(&GalaxyConfig::default(), &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn galaxy_deterministic_same_seed() {
        let a = generate(17);
        let b = generate(17);
        assert_eq!(a.regions(), b.regions());
        let names_a: Vec<_> = a.planets.iter().map(|p| p.name.clone()).collect();
        let names_b: Vec<_> = b.planets.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn counts_match_config() {
        let galaxy = generate(5);
        assert_eq!(galaxy.systems.len(), 2);
        assert_eq!(galaxy.mazes.len(), 4);
        assert_eq!(galaxy.planets.len() + galaxy.belts.len(), 10);
        assert!(galaxy.belts.len() <= 2);
        assert!(!galaxy.systems[0].hard);
        assert!(galaxy.systems[1].hard);
        assert_eq!(galaxy.systems[0].position, Vec2::ZERO);
    }

    #[test]
    fn regions_never_overlap() {
        for seed in 0..10 {
            let regions = generate(seed).regions();
            for (i, a) in regions.iter().enumerate() {
                for b in &regions[i + 1..] {
                    assert!(a.center.distance(b.center) >= a.radius + b.radius - 1e-3);
                }
            }
        }
    }

    #[test]
    fn planets_belong_to_their_system() {
        let galaxy = generate(8);
        for (si, system) in galaxy.systems.iter().enumerate() {
            for &pi in &system.planets {
                let planet = &galaxy.planets[pi];
                assert_eq!(planet.system, si);
                assert!(planet.position().distance(system.position) < system.radius);
            }
        }
    }

    #[test]
    fn belts_stay_inside_their_system_clear_of_planets() {
        let mut belts = 0;
        for seed in 0..10 {
            let galaxy = generate(seed);
            for (si, system) in galaxy.systems.iter().enumerate() {
                for &bi in &system.belts {
                    let belt = &galaxy.belts[bi];
                    belts += 1;
                    assert_eq!(belt.system, si);
                    assert_eq!(belt.center, system.position);
                    assert!(belt.inner_radius() > STAR_ZONE_RADIUS);
                    assert!(belt.outer_radius() < system.radius);
                    for &pi in &system.planets {
                        let planet = &galaxy.planets[pi];
                        let apart = (planet.orbit.distance - belt.radius).abs();
                        assert!(apart >= belt.half_width + planet.full_height());
                    }
                    assert_eq!(galaxy.belt_at(belt.center + Vec2::new(belt.radius, 0.0)), Some(bi));
                }
            }
        }
        assert!(belts > 0);
    }

    #[test]
    fn no_belt_configs_means_no_belts() {
        let config = GalaxyConfig {
            belts: Vec::new(),
            ..GalaxyConfig::default()
        };
        let galaxy = Galaxy::generate(&config, &mut StdRng::seed_from_u64(2)).unwrap();
        assert!(galaxy.belts.is_empty());
        assert_eq!(galaxy.planets.len(), 10);
    }

    #[test]
    fn empty_system_list_is_rejected() {
        let config = GalaxyConfig {
            systems: Vec::new(),
            ..GalaxyConfig::default()
        };
        let result = Galaxy::generate(&config, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(GenError::EmptyConfig("systems"))));
    }
}
