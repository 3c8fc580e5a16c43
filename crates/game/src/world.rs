//! The world context: galaxy, physics, streamed objects and the per-tick pipeline.

use crate::drawables::SpriteInstance;
use crate::error::WorldError;
use crate::events::WorldEvent;
use crate::gravity::{GravityEffect, GravityField, GravitySource};
use crate::maze_builder::MazeBuilder;
use crate::object_manager::{ObjectManager, StreamingConfig, TickReport};
use crate::objects::{FarObject, FarShip, ObjectId, Pilot, ShipState, UpdateContext};
use crate::settings::{Settings, SimConfig};
use crate::surface::{find_landing_places, SurfaceContentGenerator};
use engine_core::{math, Faction, Transform2D, Velocity};
use glam::Vec2;
use physics::PhysicsWorld;
use procgen::{Galaxy, HullConfig, Planet, TileTable, STAR_ZONE_RADIUS};
use rand::prelude::*;
use std::collections::HashMap;
use std::f32::consts::PI;

fn drifting_hostile(hull: &HullConfig, position: Vec2, angle: f32) -> FarObject {
    FarObject::Ship(FarShip::new(
        ShipState::new(hull.clone(), Faction::Hostile, Pilot::Idle),
        Transform2D::new(position, angle),
        Velocity::default(),
    ))
}

pub struct World {
    pub sim: SimConfig,
    pub galaxy: Galaxy,
    physics: PhysicsWorld,
    manager: ObjectManager,
    tile_tables: HashMap<String, TileTable>,
    rng: StdRng,
    events: Vec<WorldEvent>,
    elapsed: f64,
}

impl World {
    /// Generate a galaxy from settings and seed its free-space traffic.
    pub fn new(settings: &Settings) -> Result<Self, WorldError> {
        settings.validate()?;
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let galaxy = Galaxy::generate(&settings.galaxy, &mut rng)?;
        let mut world = Self::with_galaxy(galaxy, settings.sim.clone(), rng);
        world.spawn_space_enemies();
        Ok(world)
    }

    /// Wrap an already generated galaxy. No objects are created.
    pub fn with_galaxy(galaxy: Galaxy, sim: SimConfig, rng: StdRng) -> Self {
        let mut tile_tables = HashMap::new();
        for planet in &galaxy.planets {
            let name = &planet.config.tile_set;
            if !tile_tables.contains_key(name) {
                tile_tables.insert(name.clone(), TileTable::generate(name, sim.tile_variants));
            }
        }
        let streaming = StreamingConfig::new(sim.view_distance, sim.hysteresis_margin);
        let manager = ObjectManager::new(streaming);
        Self {
            sim,
            galaxy,
            physics: PhysicsWorld::new(),
            manager,
            tile_tables,
            rng,
            events: Vec::new(),
            elapsed: 0.0,
        }
    }

    fn spawn_space_enemies(&mut self) {
        let mut spawned = 0;
        for system in &self.galaxy.systems {
            for template in &system.config.space_enemies {
                let count = (template.density * system.radius) as usize;
                for _ in 0..count {
                    let angle = self.rng.gen_range(-PI..PI);
                    let outer = system.radius.max(STAR_ZONE_RADIUS + 1.0);
                    let dist = self.rng.gen_range(STAR_ZONE_RADIUS..outer);
                    let position = system.position + math::from_angle_len(angle, dist);
                    let facing = self.rng.gen_range(-PI..PI);
                    self.manager
                        .add_far_now(drifting_hostile(&template.hull, position, facing));
                    spawned += 1;
                }
            }
        }
        for belt in &self.galaxy.belts {
            for template in &belt.config.enemies {
                let count = (template.density * belt.length()) as usize;
                for _ in 0..count {
                    let angle = self.rng.gen_range(-PI..PI);
                    let dist = self.rng.gen_range(belt.inner_radius()..belt.outer_radius());
                    let position = belt.center + math::from_angle_len(angle, dist);
                    let facing = self.rng.gen_range(-PI..PI);
                    self.manager
                        .add_far_now(drifting_hostile(&template.hull, position, facing));
                    spawned += 1;
                }
            }
        }
        log::info!("Spawned {} free-space and belt ships", spawned);
    }

    pub fn planets(&self) -> &[Planet] {
        &self.galaxy.planets
    }

    pub fn manager(&self) -> &ObjectManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ObjectManager {
        &mut self.manager
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Simulated seconds since the world was created.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance the simulation by one fixed step, seen from `camera`.
    pub fn tick(&mut self, camera: Vec2) -> Result<TickReport, WorldError> {
        let dt = self.sim.timestep;
        self.elapsed += dt as f64;
        for planet in &mut self.galaxy.planets {
            planet.advance(dt);
        }

        let due: Vec<usize> = (0..self.galaxy.planets.len())
            .filter(|i| self.galaxy.planets[*i].should_materialize(camera))
            .collect();
        for index in due {
            self.materialize_planet(index)?;
        }

        let trigger = self.sim.maze_trigger * self.sim.view_distance;
        let due: Vec<usize> = (0..self.galaxy.mazes.len())
            .filter(|i| self.galaxy.mazes[*i].should_build(camera, trigger))
            .collect();
        for index in due {
            self.build_maze(index);
        }

        let ctx = UpdateContext {
            camera,
            dt,
            planets: &self.galaxy.planets,
        };
        let report = self.manager.tick(&mut self.physics, &ctx);
        self.events.extend(WorldEvent::from_report(&report));

        let field = self.gravity_field(camera);
        for (id, effect) in field.apply(&mut self.manager, &mut self.physics, dt) {
            match effect {
                GravityEffect::Recover { .. } => self.events.push(WorldEvent::Recovered(id)),
                GravityEffect::Burn { damage, .. } => {
                    self.events.push(WorldEvent::Burned { id, damage })
                }
                _ => {}
            }
        }
        Ok(report)
    }

    /// Gravity sources nearest to `camera`.
    pub fn gravity_field(&self, camera: Vec2) -> GravityField {
        let planet = self
            .galaxy
            .nearest_planet(camera)
            .map(|i| GravitySource::planet(&self.galaxy.planets[i]));
        let star = self
            .galaxy
            .nearest_system(camera)
            .map(|i| GravitySource::star(&self.galaxy.systems[i], self.sim.star_grav_const));
        GravityField {
            planet,
            star,
            star_damage: self.sim.star_damage,
            recovery_margin: self.sim.recovery_margin,
        }
    }

    /// Build a planet's ground, clouds, decoration and ships. Runs once per planet.
    pub fn materialize_planet(&mut self, index: usize) -> Result<(), WorldError> {
        let Some(planet) = self.galaxy.planets.get(index) else {
            return Ok(());
        };
        if planet.objects_created() {
            return Ok(());
        }
        let tiles = self
            .tile_tables
            .get(&planet.config.tile_set)
            .ok_or_else(|| WorldError::UnknownTileSet(planet.config.tile_set.clone()))?;

        let before = self.manager.near_count() + self.manager.far_count();
        let min_ground = SurfaceContentGenerator::new(tiles).populate(
            index,
            planet,
            &mut self.manager,
            &mut self.physics,
            &mut self.rng,
        )?;
        let landing = find_landing_places(planet, &self.physics, &mut self.rng);
        let objects = self.manager.near_count() + self.manager.far_count() - before;

        log::info!(
            "Materialized planet {} ({}): {} objects, ground down to {:.1}",
            planet.name,
            planet.config.name,
            objects,
            min_ground
        );
        self.galaxy.planets[index].mark_materialized(min_ground, landing);
        self.events.push(WorldEvent::PlanetMaterialized {
            planet: index,
            objects,
        });
        Ok(())
    }

    /// Lay out a maze's walls and garrison. Runs once per maze.
    pub fn build_maze(&mut self, index: usize) {
        let Some(maze) = self.galaxy.mazes.get(index) else {
            return;
        };
        if maze.is_built() {
            return;
        }
        let report = MazeBuilder::new(maze, self.sim.tile_variants, &mut self.rng).build(
            maze,
            &mut self.manager,
            &mut self.rng,
        );
        log::info!(
            "Built maze {} at {:?}: {} tiles, {} ships",
            maze.config.name,
            maze.position,
            report.tiles,
            report.ships
        );
        self.galaxy.mazes[index].mark_built();
        self.events.push(WorldEvent::MazeBuilt {
            maze: index,
            tiles: report.tiles,
            ships: report.ships,
        });
    }

    /// Add a friendly ship that stays simulated wherever it goes.
    pub fn spawn_player(&mut self, hull: HullConfig, position: Vec2) -> ObjectId {
        let ship = FarShip::new(
            ShipState::new(hull, Faction::Friendly, Pilot::Idle),
            Transform2D::from_position(position),
            Velocity::default(),
        );
        let id = self.manager.add_near_now(FarObject::Ship(ship), &mut self.physics);
        self.manager.pin(id);
        id
    }

    /// Current position of an object in either tier.
    pub fn position_of(&self, id: ObjectId) -> Option<Vec2> {
        self.manager
            .near(id)
            .map(|o| o.position())
            .or_else(|| self.manager.far(id).map(FarObject::position))
    }

    /// Overwrite the velocity of a near ship.
    pub fn steer(&mut self, id: ObjectId, velocity: Vec2) {
        if let Some(ship) = self.manager.near_mut(id).and_then(|o| o.as_ship_mut()) {
            ship.velocity = Velocity::with_angular(velocity, 0.0);
            self.physics.set_velocity(ship.body.rigid_body, ship.velocity);
        }
    }

    pub fn collect_sprites(&self, out: &mut Vec<SpriteInstance>) {
        self.manager.collect_sprites(out);
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}
