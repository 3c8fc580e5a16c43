//! One-shot planet materialization: ground, clouds, decoration and ships.

use crate::drawables::{DrawLayer, SpriteDesc};
use crate::error::WorldError;
use crate::object_manager::ObjectManager;
use crate::objects::{
    orbit_velocity, Anchor, FarObject, FarShip, FarTile, Pilot, PlanetSprites, ShipState,
};
use crate::placement::{find_flat, find_landing, ConsumedAngles};
use engine_core::{math, Faction, Transform2D, Velocity};
use glam::Vec2;
use physics::{CollisionGroup, PhysicsWorld};
use procgen::{
    DecoConfig, GroundBuilder, GroundConfig, Planet, RingLayout, ShipTemplate, TileTable,
    MAX_GROUND_HEIGHT, TOP_TILE_SIZE,
};
use rand::prelude::*;
use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, PI};

const CLOUD_DENSITY: f32 = 0.2;
const MAX_CLOUD_PIECE_SIZE: f32 = 1.5;
const MAX_CLOUD_PIECE_COUNT: f32 = 30.0;
const MAX_CLOUD_PIECE_SPIN: f32 = 5.0 * PI / 180.0;
const MAX_CLOUD_PIECE_DIST_SHIFT: f32 = 1.0;
const MAX_CLOUD_DRIFT: f32 = 0.1;
const AVG_CLOUD_WIDTH: f32 = 3.0;

const DECO_PACK_SIZE: f32 = 5.0;
const DECO_PACK_ANGULAR_WIDTH: f32 = DECO_PACK_SIZE / MAX_GROUND_HEIGHT;
const DECO_ANGLE_TRIES: usize = 5;

/// Landing places cached per planet.
pub const LANDING_PLACES: usize = 10;

/// Builds every object of a planet the first time the camera comes near.
pub struct SurfaceContentGenerator<'a> {
    tiles: &'a TileTable,
}

impl<'a> SurfaceContentGenerator<'a> {
    pub fn new(tiles: &'a TileTable) -> Self {
        Self { tiles }
    }

    /// Create the planet's objects and return the innermost ground radius.
    pub fn populate(
        &self,
        index: usize,
        planet: &Planet,
        manager: &mut ObjectManager,
        physics: &mut PhysicsWorld,
        rng: &mut StdRng,
    ) -> Result<f32, WorldError> {
        let min_radius = self.create_ground(index, planet, manager, physics, rng)?;
        create_clouds(index, planet, manager, rng);
        for deco in &planet.config.deco {
            create_deco(index, planet, deco, manager, physics, rng);
        }
        create_ships(index, planet, manager, physics, rng);
        Ok(min_radius)
    }

    fn create_ground(
        &self,
        index: usize,
        planet: &Planet,
        manager: &mut ObjectManager,
        physics: &mut PhysicsWorld,
        rng: &mut StdRng,
    ) -> Result<f32, WorldError> {
        let layout = RingLayout::new(planet.ground_height, planet.config.row_count)?;
        let map = GroundBuilder::new(
            GroundConfig::from(planet.config.as_ref()),
            self.tiles,
            layout.columns,
            layout.rows(),
        )
        .build(rng);

        let mut solid = 0;
        for (col, row, tile) in map.tiles() {
            let far = FarObject::Tile(FarTile::new(
                index,
                planet,
                layout.column_angle(col),
                layout.radii[row],
                layout.tile_sizes[row],
                tile.clone(),
            ));
            if tile.has_collision() {
                manager.add_near_now(far, physics);
                solid += 1;
            } else {
                manager.add_far_now(far);
            }
        }
        physics.update_query_pipeline();
        log::debug!(
            "Planet {}: {} columns, {} solid tiles",
            planet.name,
            layout.columns,
            solid
        );
        Ok(layout.min_radius)
    }
}

/// Planet-local landing places found on the freshly built ground.
pub fn find_landing_places(planet: &Planet, physics: &PhysicsWorld, rng: &mut StdRng) -> Vec<Vec2> {
    let mut consumed = ConsumedAngles::new();
    (0..LANDING_PLACES)
        .map(|_| find_landing(planet, physics, &mut consumed, rng))
        .collect()
}

fn create_clouds(index: usize, planet: &Planet, manager: &mut ObjectManager, rng: &mut StdRng) {
    if planet.config.cloud_sprites.is_empty() {
        return;
    }
    let max = CLOUD_DENSITY * planet.atmosphere_height * planet.ground_height;
    let count = (rng.gen_range(0.7..1.0) * max) as usize;
    for _ in 0..count {
        let cloud = create_cloud(index, planet, rng);
        manager.add_far_now(FarObject::Sprites(cloud));
    }
}

fn create_cloud(index: usize, planet: &Planet, rng: &mut StdRng) -> PlanetSprites {
    let dist_perc: f32 = rng.gen_range(0.0..1.0);
    let dist = planet.ground_height - TOP_TILE_SIZE + 0.9 * planet.atmosphere_height * dist_perc;
    let angle = rng.gen_range(-PI..PI);

    let size_perc = rng.gen_range(0.2..1.0);
    let width = size_perc * (dist_perc + 0.5) * AVG_CLOUD_WIDTH;
    let max_angle_shift = math::arc_to_angle(width, dist);
    let max_dist_shift = (1.0 - dist_perc) * MAX_CLOUD_PIECE_DIST_SHIFT;
    let pieces = ((size_perc * MAX_CLOUD_PIECE_COUNT) as usize).max(1);

    let sprites = (0..pieces)
        .map(|_| cloud_piece(planet, max_angle_shift, max_dist_shift, dist, rng))
        .collect();
    let drift = rng.gen_range(0.1..1.0) * math::arc_to_angle(MAX_CLOUD_DRIFT, dist);
    PlanetSprites::new(index, planet, angle, dist, drift, sprites)
}

fn cloud_piece(
    planet: &Planet,
    max_angle_shift: f32,
    max_dist_shift: f32,
    base_dist: f32,
    rng: &mut StdRng,
) -> SpriteDesc {
    let shift_rel: f32 = rng.gen_range(-1.0..1.0);
    let center_perc = 1.0 - shift_rel.abs();
    let dist_shift = if max_dist_shift > 0.0 {
        center_perc * rng.gen_range(0.0..max_dist_shift)
    } else {
        0.0
    };
    let sprite = planet
        .config
        .cloud_sprites
        .choose(rng)
        .cloned()
        .unwrap_or_default();

    let mut desc = SpriteDesc::new(
        sprite,
        0.5 * (1.0 + center_perc) * MAX_CLOUD_PIECE_SIZE,
        DrawLayer::Clouds,
    );
    // Cluster frame: +Y along the radius through the cluster center.
    let piece_angle = FRAC_PI_2 + shift_rel * max_angle_shift;
    desc.rel_pos =
        math::from_angle_len(piece_angle, base_dist + dist_shift) - Vec2::new(0.0, base_dist);
    desc.rel_angle = rng.gen_range(-PI / 6.0..PI / 6.0);
    desc.rotation_speed = rng.gen_range(-MAX_CLOUD_PIECE_SPIN..MAX_CLOUD_PIECE_SPIN);
    desc.flipped = rng.gen_bool(0.5);
    desc
}

fn create_deco(
    index: usize,
    planet: &Planet,
    config: &DecoConfig,
    manager: &mut ObjectManager,
    physics: &PhysicsWorld,
    rng: &mut StdRng,
) {
    if config.sprites.is_empty() {
        return;
    }
    let gh = planet.ground_height;
    let mut consumed = ConsumedAngles::new();
    let mut packs: BTreeMap<(i32, i32), Vec<SpriteDesc>> = BTreeMap::new();
    let count = (std::f32::consts::TAU * gh * config.density) as usize;

    for _ in 0..count {
        let size = if config.size_max > config.size_min {
            rng.gen_range(config.size_min..config.size_max)
        } else {
            config.size_min
        };
        let half_width = math::angular_half_width(size / 2.0, gh);

        let mut angle = 0.0;
        for _ in 0..DECO_ANGLE_TRIES {
            angle = rng.gen_range(-PI..PI);
            if !consumed.is_consumed(angle, half_width) {
                consumed.add(angle, half_width);
                break;
            }
        }

        let from = planet.to_world(math::from_angle_len(angle, gh));
        let dist = physics
            .cast_segment(from, planet.position(), CollisionGroup::ground_query())
            .map_or(gh, |hit| hit.point.distance(planet.position()));

        let key = (
            math::window_index(angle, DECO_PACK_ANGULAR_WIDTH),
            math::window_index(dist, DECO_PACK_SIZE),
        );
        let base_angle = math::window_center(angle, DECO_PACK_ANGULAR_WIDTH);
        let base_dist = math::window_center(dist, DECO_PACK_SIZE);
        let offset = math::from_angle_len(angle, dist) - math::from_angle_len(base_angle, base_dist);

        let sprite = config.sprites.choose(rng).cloned().unwrap_or_default();
        let mut desc = SpriteDesc::new(sprite, size, DrawLayer::Deco);
        desc.rel_angle = angle - base_angle;
        desc.rel_pos = math::rotate(offset, FRAC_PI_2 - base_angle)
            + math::rotate(Vec2::new(0.0, size / 2.0), desc.rel_angle);
        desc.flipped = config.allow_flip && rng.gen_bool(0.5);
        packs.entry(key).or_default().push(desc);
    }

    for ((angle_cell, dist_cell), sprites) in packs {
        let angle = (angle_cell as f32 + 0.5) * DECO_PACK_ANGULAR_WIDTH;
        let dist = (dist_cell as f32 + 0.5) * DECO_PACK_SIZE;
        let pack = PlanetSprites::new(index, planet, angle, dist, 0.0, sprites);
        manager.add_far_now(FarObject::Sprites(pack));
    }
}

fn create_ships(
    index: usize,
    planet: &Planet,
    manager: &mut ObjectManager,
    physics: &mut PhysicsWorld,
    rng: &mut StdRng,
) {
    let mut taken = ConsumedAngles::new();
    let config = planet.config.clone();

    if let Some(station) = &config.station {
        let ship = ground_ship(index, planet, station, Faction::Friendly, &mut taken, physics, rng);
        manager.add_near_now(FarObject::Ship(ship), physics);
    }

    let gh = planet.ground_height;
    for template in &config.ground_enemies {
        let count = (template.density * gh) as usize;
        for _ in 0..count {
            let ship =
                ground_ship(index, planet, template, Faction::Hostile, &mut taken, physics, rng);
            manager.add_far_now(FarObject::Ship(ship));
        }
    }

    orbit_enemies(index, planet, 0.0, 0.1, &config.low_orbit_enemies, manager, rng);
    orbit_enemies(index, planet, 0.1, 0.6, &config.high_orbit_enemies, manager, rng);
}

fn ground_ship(
    index: usize,
    planet: &Planet,
    template: &ShipTemplate,
    faction: Faction,
    taken: &mut ConsumedAngles,
    physics: &PhysicsWorld,
    rng: &mut StdRng,
) -> FarShip {
    let hull = &template.hull;
    let station = hull.is_station();
    let spot = find_flat(planet, physics, taken, hull.approx_radius, rng);
    let height = spot.length().max(f32::EPSILON);
    let above_ground = if station { hull.size * 0.75 } else { hull.size };
    let local = spot * (height + above_ground) / height;

    let mut local_angle = math::angle_of(local);
    if station {
        local_angle -= FRAC_PI_2;
    }
    let position = planet.to_world(local);
    let pilot = Pilot::StillGuard(Anchor::Planet {
        planet: index,
        local,
        local_angle,
    });
    FarShip::new(
        ShipState::new(hull.clone(), faction, pilot),
        Transform2D::new(position, math::norm_angle(planet.angle() + local_angle)),
        Velocity::with_angular(planet.velocity_at(position), planet.orbit.rotation_speed),
    )
}

fn orbit_enemies(
    index: usize,
    planet: &Planet,
    offset: f32,
    band: f32,
    templates: &[ShipTemplate],
    manager: &mut ObjectManager,
    rng: &mut StdRng,
) {
    let counts: Vec<usize> = templates
        .iter()
        .map(|t| (band * t.density * planet.ground_height * planet.atmosphere_height) as usize)
        .collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return;
    }
    let step = band / total as f32;
    let mut height_perc = offset;

    for (template, count) in templates.iter().zip(counts) {
        for _ in 0..count {
            let height = planet.ground_height + height_perc * planet.atmosphere_height;
            let angle = rng.gen_range(-PI..PI);
            let speed = crate::objects::orbit_speed(planet.grav_const, height);
            let clockwise = rng.gen_bool(0.5);
            let pilot = Pilot::Orbiter {
                planet: index,
                height,
                clockwise,
            };
            let ship = FarShip::new(
                ShipState::new(template.hull.clone(), Faction::Hostile, pilot),
                Transform2D::from_position(planet.position() + math::from_angle_len(angle, height)),
                Velocity::new(orbit_velocity(angle, speed, clockwise)),
            );
            manager.add_far_now(FarObject::Ship(ship));
            height_perc += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_manager::StreamingConfig;
    use crate::objects::ObjectKind;
    use procgen::{Orbit, PlanetConfig};
    use std::sync::Arc;

    fn planet(config: PlanetConfig) -> Planet {
        Planet::new(
            "Home".to_string(),
            Arc::new(config),
            0,
            Vec2::ZERO,
            Orbit {
                distance: 120.0,
                angle_to_system: 0.3,
                orbit_speed: 0.001,
                angle: 0.4,
                rotation_speed: 0.01,
            },
            20.0,
            &mut StdRng::seed_from_u64(0),
        )
    }

    fn populate(config: PlanetConfig, seed: u64) -> (Planet, ObjectManager, PhysicsWorld, f32) {
        let p = planet(config);
        let tiles = TileTable::generate(&p.config.tile_set, 2);
        let mut manager = ObjectManager::new(StreamingConfig::new(24.0, 0.33));
        let mut physics = PhysicsWorld::new();
        let min = SurfaceContentGenerator::new(&tiles)
            .populate(0, &p, &mut manager, &mut physics, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        (p, manager, physics, min)
    }

    fn count_kind(manager: &ObjectManager, kind: ObjectKind) -> usize {
        manager.near_objects().filter(|(_, o)| o.kind() == kind).count()
            + manager.far_objects().filter(|(_, o)| o.kind() == kind).count()
    }

    #[test]
    fn ground_is_split_by_collision() {
        let (_, manager, _, min) = populate(PlanetConfig::default(), 3);
        assert!(min > 0.0 && min < 20.0);
        let near_tiles = manager
            .near_objects()
            .filter(|(_, o)| o.kind() == ObjectKind::Tile)
            .count();
        let far_tiles = manager
            .far_objects()
            .filter(|(_, o)| o.kind() == ObjectKind::Tile)
            .count();
        assert!(near_tiles > 0);
        assert!(far_tiles > 0);
    }

    #[test]
    fn station_starts_near_and_enemies_far() {
        let (_, manager, _, _) = populate(PlanetConfig::default(), 4);
        let near_ships = manager
            .near_objects()
            .filter_map(|(_, o)| o.as_ship())
            .collect::<Vec<_>>();
        assert_eq!(near_ships.len(), 1);
        assert!(near_ships[0].state.hull.is_station());
        assert_eq!(near_ships[0].state.faction, Faction::Friendly);

        // 0.1 * 20 ground guards plus both orbit bands.
        let far_ships = manager.far_objects().filter(|(_, o)| o.as_ship().is_some()).count();
        let low = (0.1 * 0.02 * 20.0 * 14.0) as usize;
        let high = (0.6 * 0.01 * 20.0 * 14.0) as usize;
        assert_eq!(far_ships, 2 + low + high);
    }

    #[test]
    fn orbiters_fly_at_circular_speed() {
        let (p, manager, _, _) = populate(PlanetConfig::default(), 5);
        for (_, object) in manager.far_objects() {
            if let Some(ship) = object.as_ship() {
                if let Pilot::Orbiter { height, .. } = ship.state.pilot {
                    let expected = (p.grav_const / height).sqrt();
                    assert!((ship.velocity.linear.length() - expected).abs() < 1e-3);
                    let dist = ship.transform.position.distance(p.position());
                    assert!((dist - height).abs() < 1e-3);
                    assert!(height >= p.ground_height && height <= p.full_height());
                }
            }
        }
    }

    #[test]
    fn clouds_and_deco_become_sprite_packs() {
        let (_, manager, _, _) = populate(PlanetConfig::default(), 6);
        let packs = count_kind(&manager, ObjectKind::Sprites);
        let max_clouds = (CLOUD_DENSITY * 14.0 * 20.0) as usize;
        assert!(packs > (0.7 * max_clouds as f32) as usize - 1);
    }

    #[test]
    fn no_station_no_clouds() {
        let config = PlanetConfig {
            station: None,
            cloud_sprites: Vec::new(),
            deco: Vec::new(),
            ..PlanetConfig::default()
        };
        let (_, manager, _, _) = populate(config, 7);
        assert_eq!(count_kind(&manager, ObjectKind::Sprites), 0);
        assert!(manager.near_objects().all(|(_, o)| o.as_ship().is_none()));
    }

    #[test]
    fn landing_places_sit_on_the_ground() {
        let (p, _, physics, min) = populate(PlanetConfig::default(), 8);
        let places = find_landing_places(&p, &physics, &mut StdRng::seed_from_u64(1));
        assert_eq!(places.len(), LANDING_PLACES);
        for place in &places {
            let r = place.length();
            assert!(r >= min && r <= p.ground_height + 0.5, "radius {r}");
        }
        for (i, a) in places.iter().enumerate() {
            for b in &places[i + 1..] {
                let apart = math::angle_diff(math::angle_of(*a), math::angle_of(*b));
                assert!(apart > 1.0_f32.to_radians(), "landing places {apart} rad apart");
            }
        }
    }
}
