//! End-to-end behaviour of the world core.

use engine_core::{Faction, Transform2D, Velocity};
use game::gravity::{GravityEffect, GravitySource};
use game::object_manager::{ObjectManager, StreamingConfig};
use game::objects::{to_far, to_near, FarObject, FarShip, ObjectId, Pilot, ShipState, UpdateContext};
use game::{Settings, SettingsError, SimConfig, World, WorldError, WorldEvent};
use glam::Vec2;
use physics::PhysicsWorld;
use procgen::{
    Galaxy, GalaxyConfig, GroundBuilder, GroundConfig, HullConfig, Orbit, Planet, PlanetConfig,
    Region, SpatialPlacer, TileTable, STAR_ZONE_RADIUS,
};
use rand::prelude::*;
use std::sync::Arc;

fn idle_ship(position: Vec2, velocity: Vec2) -> FarObject {
    FarObject::Ship(FarShip::new(
        ShipState::new(HullConfig::default(), Faction::Hostile, Pilot::Idle),
        Transform2D::new(position, 0.3),
        Velocity::with_angular(velocity, 0.2),
    ))
}

fn small_galaxy() -> GalaxyConfig {
    GalaxyConfig {
        system_count: 1,
        maze_count: 1,
        planets_per_system: 2,
        ..GalaxyConfig::default()
    }
}

fn world(seed: u64) -> World {
    let settings = Settings {
        seed,
        galaxy: small_galaxy(),
        ..Settings::default()
    };
    World::new(&settings).unwrap()
}

#[test]
fn atmosphere_edge_bounds_planet_gravity() {
    let mut planet = Planet::new(
        "Large".to_string(),
        Arc::new(PlanetConfig::default()),
        0,
        Vec2::ZERO,
        Orbit {
            distance: 200.0,
            angle_to_system: 0.0,
            orbit_speed: 0.0,
            angle: 0.0,
            rotation_speed: 0.0,
        },
        40.0,
        &mut StdRng::seed_from_u64(1),
    );
    planet.atmosphere_height = 10.0;
    let field = game::gravity::GravityField {
        planet: Some(GravitySource::planet(&planet)),
        star: None,
        star_damage: 4.0,
        recovery_margin: 1.0,
    };

    let center = planet.position();
    assert!(matches!(
        field.sample(center + Vec2::new(45.0, 0.0), true, 1.0 / 60.0),
        GravityEffect::Pull(_)
    ));
    assert_eq!(
        field.sample(center + Vec2::new(0.0, 60.0), true, 1.0 / 60.0),
        GravityEffect::None
    );
}

#[test]
fn placer_keeps_three_regions_apart() {
    let placer = SpatialPlacer::new(STAR_ZONE_RADIUS, 10_000);
    let mut rng = StdRng::seed_from_u64(42);
    let mut regions: Vec<Region> = Vec::new();
    for radius in [10.0, 15.0, 10.0] {
        let center = placer.place(&regions, radius, &mut rng).unwrap();
        regions.push(Region::new(center, radius));
    }
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            assert!(a.center.distance(b.center) >= a.radius + b.radius - 1e-3);
        }
    }
}

#[test]
fn ring_of_36_columns_respects_purity() {
    let tiles = TileTable::generate("rocky", 2);
    let config = GroundConfig::default();
    let builder = GroundBuilder::new(config, &tiles, 36, 6);
    let runs = 400;
    let mut total = 0.0;
    for seed in 0..runs {
        let fraction = builder.build(&mut StdRng::seed_from_u64(seed)).pure_ground_fraction();
        assert!(fraction >= config.purity, "seed {seed}: {fraction} below {}", config.purity);
        total += fraction;
    }
    let mean = total / runs as f32;
    assert!((mean - 0.53).abs() < 0.03, "mean pure fraction {mean}");
}

#[test]
fn far_ship_inside_activation_is_near_after_boundary() {
    let mut physics = PhysicsWorld::new();
    let mut manager = ObjectManager::new(StreamingConfig::new(24.0, 0.33));
    let id = manager.add_far_now(idle_ship(Vec2::new(500.0, 0.0), Vec2::ZERO));
    let ctx = |camera| UpdateContext {
        camera,
        dt: 1.0 / 60.0,
        planets: &[],
    };

    manager.tick(&mut physics, &ctx(Vec2::ZERO));
    assert!(manager.contains_far(id));

    if let Some(FarObject::Ship(ship)) = manager.far_mut(id) {
        ship.transform.position = Vec2::new(20.0, 0.0);
    }
    let report = manager.tick(&mut physics, &ctx(Vec2::ZERO));
    assert_eq!(report.promoted, vec![id]);
    assert!(manager.contains_near(id));
    assert!(!manager.contains_far(id));
}

#[test]
fn ship_at_planet_center_is_recovered_above_atmosphere() {
    let mut world = world(11);
    let camera = world.planets()[0].position();
    world.tick(camera).unwrap();
    assert!(world.planets()[0].objects_created());

    let center = world.planets()[0].position();
    let id = world.spawn_player(HullConfig::default(), center);
    world.tick(camera).unwrap();

    let planet = &world.planets()[0];
    let position = world.position_of(id).unwrap();
    let dist = position.distance(planet.position());
    let expected = planet.full_height() + world.sim.recovery_margin;
    assert!((dist - expected).abs() < 0.05, "distance {dist}, expected {expected}");

    let ship = world.manager().near(id).and_then(|o| o.as_ship()).unwrap();
    assert_eq!(ship.velocity, Velocity::default());
    assert!(world
        .drain_events()
        .iter()
        .any(|e| *e == WorldEvent::Recovered(id)));
}

#[test]
fn round_trip_preserves_ship_state() {
    let mut physics = PhysicsWorld::new();
    let far = idle_ship(Vec2::new(3.0, 4.0), Vec2::new(-1.0, 0.5));
    let near = to_near(ObjectId(9), far.clone(), &mut physics);
    let back = to_far(near, &mut physics);
    let (a, b) = (far.as_ship().unwrap(), back.as_ship().unwrap());
    assert!((a.transform.position - b.transform.position).length() < 1e-5);
    assert!((a.velocity.linear - b.velocity.linear).length() < 1e-5);
    assert!((a.transform.angle - b.transform.angle).abs() < 1e-5);
    assert_eq!(physics.body_count(), 0);
}

#[test]
fn planet_materializes_exactly_once() {
    let mut world = world(3);
    let camera = world.planets()[1].position();
    for _ in 0..5 {
        world.tick(camera).unwrap();
    }
    let materialized: Vec<usize> = world
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            WorldEvent::PlanetMaterialized { planet, .. } => Some(planet),
            _ => None,
        })
        .collect();
    assert_eq!(materialized, vec![1]);
    assert!(world.planets()[1].objects_created());
    assert!(!world.planets()[0].objects_created());
    assert_eq!(world.planets()[1].landing_places().len(), 10);
    assert!(world.planets()[1].min_ground_height() < world.planets()[1].ground_height);
}

#[test]
fn maze_builds_when_camera_approaches() {
    let mut world = world(5);
    let maze = world.galaxy.mazes[0].position;
    world.tick(maze).unwrap();
    assert!(world.galaxy.mazes[0].is_built());
    assert!(world
        .drain_events()
        .iter()
        .any(|e| matches!(e, WorldEvent::MazeBuilt { maze: 0, .. })));
    let mut sprites = Vec::new();
    world.collect_sprites(&mut sprites);
    assert!(!sprites.is_empty());
}

#[test]
fn same_seed_gives_same_world() {
    let a = world(21);
    let b = world(21);
    assert_eq!(a.galaxy.regions(), b.galaxy.regions());
    assert_eq!(a.manager().far_count(), b.manager().far_count());
}

#[test]
fn galaxy_without_objects_wraps_cleanly() {
    let mut rng = StdRng::seed_from_u64(0);
    let galaxy = Galaxy::generate(&small_galaxy(), &mut rng).unwrap();
    let world = World::with_galaxy(galaxy, SimConfig::default(), rng);
    assert_eq!(world.manager().near_count() + world.manager().far_count(), 0);
}

#[test]
fn negative_hysteresis_margin_is_refused() {
    let mut settings = Settings {
        galaxy: small_galaxy(),
        ..Settings::default()
    };
    settings.sim.hysteresis_margin = -0.2;
    assert!(matches!(
        World::new(&settings),
        Err(WorldError::Settings(SettingsError::NegativeMargin(_)))
    ));
}

#[test]
fn belts_are_patrolled_from_the_start() {
    let galaxy = GalaxyConfig {
        system_count: 1,
        maze_count: 0,
        ..GalaxyConfig::default()
    };
    let world = (0..20)
        .map(|seed| {
            World::new(&Settings {
                seed,
                galaxy: galaxy.clone(),
                ..Settings::default()
            })
            .unwrap()
        })
        .find(|w| !w.galaxy.belts.is_empty())
        .expect("a belt in 20 seeds");

    let belt = &world.galaxy.belts[0];
    let expected: usize = belt
        .config
        .enemies
        .iter()
        .map(|t| (t.density * belt.length()) as usize)
        .sum();
    assert!(expected > 0);
    let in_belt = world
        .manager()
        .far_objects()
        .filter(|(_, o)| world.galaxy.belt_at(o.position()) == Some(0))
        .count();
    assert!(in_belt >= expected, "{in_belt} ships in belt, expected {expected}");
}
