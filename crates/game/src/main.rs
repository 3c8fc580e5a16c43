//! Headless Stellar Drift driver: generates a world and flies a pinned ship through it.

use anyhow::{Context, Result};
use engine_core::{math, Time};
use game::drawables::SpriteBatch;
use game::{Settings, World, WorldEvent};
use glam::Vec2;
use procgen::{HullConfig, HullKind};
use std::time::Duration;

/// Cruise speed of the demo ship.
const CRUISE_SPEED: f32 = 8.0;
/// Waypoint reached within this distance.
const ARRIVAL_DISTANCE: f32 = 2.0;
const STATS_EVERY: u64 = 600;

#[derive(Debug, Default)]
struct EventTotals {
    planets: usize,
    mazes: usize,
    promoted: usize,
    demoted: usize,
    removed: usize,
    recovered: usize,
    burn_damage: f32,
}

impl EventTotals {
    fn record(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::PlanetMaterialized { .. } => self.planets += 1,
            WorldEvent::MazeBuilt { .. } => self.mazes += 1,
            WorldEvent::Promoted(_) => self.promoted += 1,
            WorldEvent::Demoted(_) => self.demoted += 1,
            WorldEvent::Removed(_) => self.removed += 1,
            WorldEvent::Recovered(_) => self.recovered += 1,
            WorldEvent::Burned { damage, .. } => self.burn_damage += damage,
        }
    }
}

/// Skim the atmosphere of every planet of the first system, then visit a maze.
fn waypoints(world: &World) -> Vec<Vec2> {
    let mut points: Vec<Vec2> = world
        .galaxy
        .systems
        .first()
        .map(|system| {
            system
                .planets
                .iter()
                .map(|&i| {
                    let planet = &world.galaxy.planets[i];
                    let bearing = math::angle_of(planet.position() - system.position);
                    planet.position() + math::from_angle_len(bearing, planet.full_height() + 3.0)
                })
                .collect()
        })
        .unwrap_or_default();
    if let Some(maze) = world.galaxy.mazes.first() {
        points.push(maze.position);
    }
    points
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load();
    log::info!("Generating world with seed {}", settings.seed);
    let mut world = World::new(&settings).context("failed to generate the galaxy")?;

    let route = waypoints(&world);
    let start = route.first().copied().unwrap_or(Vec2::ZERO) + Vec2::new(0.0, 5.0);
    let player = world.spawn_player(HullConfig::new("drifter", 1.4, HullKind::Standard, 200.0), start);
    let mut next = 0;

    let mut time = Time::with_fixed_step(settings.sim.timestep);
    let mut totals = EventTotals::default();
    let mut sprites = Vec::new();
    let mut batch = SpriteBatch::new();
    while time.tick_count() < settings.ticks as u64 {
        time.advance(Duration::from_secs_f32(settings.sim.timestep));
        while time.should_fixed_update() {
            let Some(position) = world.position_of(player) else {
                log::warn!("Player ship was destroyed");
                return Ok(());
            };
            if let Some(target) = route.get(next) {
                if position.distance(*target) < ARRIVAL_DISTANCE {
                    log::info!("Reached waypoint {} at {:?}", next, target);
                    next += 1;
                }
                let heading = (*target - position).clamp_length_max(CRUISE_SPEED);
                world.steer(player, heading);
            }

            world
                .tick(position)
                .with_context(|| format!("tick {} failed", time.tick_count()))?;
            for event in world.drain_events() {
                totals.record(&event);
            }

            if time.tick_count() % STATS_EVERY == 0 {
                world.collect_sprites(&mut sprites);
                batch.fill(sprites.drain(..));
                log::info!(
                    "t={:.0}s near={} far={} bodies={} sprites={} ({} layers, {} bytes)",
                    time.simulated_seconds(),
                    world.manager().near_count(),
                    world.manager().far_count(),
                    world.physics().body_count(),
                    batch.len(),
                    batch.layer_ranges().len(),
                    batch.bytes().len()
                );
            }
        }
    }

    world.collect_sprites(&mut sprites);
    batch.fill(sprites.drain(..));
    log::info!(
        "Done after {:.0}s: {} planets and {} mazes materialized, {} promotions, {} demotions, \
         {} removals, {} recoveries, {:.1} burn damage, {} sprites in view",
        world.elapsed(),
        totals.planets,
        totals.mazes,
        totals.promoted,
        totals.demoted,
        totals.removed,
        totals.recovered,
        totals.burn_damage,
        batch.len()
    );
    Ok(())
}
