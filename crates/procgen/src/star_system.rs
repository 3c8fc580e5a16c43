//! Star systems: a star with a ring of planets and at most one asteroid belt.
//!
//! A system's radius is known before it is placed: the star zone plus, for every
//! planet, two gaps, two atmospheres and the planet's diameter, and for a belt two
//! gaps and its full width. Planets and belts then sit at cumulative distances so
//! consecutive orbits never touch.

use crate::config::{BeltConfig, PlanetConfig, SystemConfig};
use crate::error::GenError;
use crate::placer::Region;
use crate::planet::{Orbit, Planet, ATMOSPHERE_HEIGHT, MAX_GROUND_HEIGHT};
use engine_core::math;
use glam::Vec2;
use rand::prelude::*;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Radius inside which a star's gravity acts.
pub const STAR_ZONE_RADIUS: f32 = 2.0 * (MAX_GROUND_HEIGHT + ATMOSPHERE_HEIGHT);
/// Inner radius where the star burns ships; also the gravity falloff clamp.
pub const STAR_HOT_RADIUS: f32 = 0.75 * STAR_ZONE_RADIUS;
pub const STAR_GRAV_CONST: f32 = 2000.0;
/// Fire damage per second inside the hot radius.
pub const STAR_DAMAGE: f32 = 4.0;
/// Empty space on both sides of every planet's sphere.
pub const PLANET_GAP: f32 = 8.0;
/// Orbital arc speed, units per second.
pub const PLANET_SPEED: f32 = 0.2;
/// Surface arc speed of planet rotation, units per second.
pub const GROUND_SPEED: f32 = 0.2;
/// Distance from a belt's center line to either edge.
pub const BELT_HALF_WIDTH: f32 = 20.0;
/// Chance that an eligible orbit slot holds a belt instead of a planet.
const BELT_CHANCE: f64 = 0.6;

/// A placed star system.
#[derive(Debug, Clone)]
pub struct SolarSystem {
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
    pub config: Arc<SystemConfig>,
    pub hard: bool,
    /// Indices of member planets in the galaxy's planet list.
    pub planets: Vec<usize>,
    /// Indices of member belts in the galaxy's belt list.
    pub belts: Vec<usize>,
}

impl SolarSystem {
    pub fn region(&self) -> Region {
        Region::new(self.position, self.radius)
    }
}

/// A ring of rubble around a star.
#[derive(Debug, Clone)]
pub struct SystemBelt {
    pub system: usize,
    pub center: Vec2,
    /// Distance of the ring's center line from the star.
    pub radius: f32,
    pub half_width: f32,
    pub config: Arc<BeltConfig>,
}

impl SystemBelt {
    pub fn inner_radius(&self) -> f32 {
        self.radius - self.half_width
    }

    pub fn outer_radius(&self) -> f32 {
        self.radius + self.half_width
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        let dist = pos.distance(self.center);
        dist >= self.inner_radius() && dist <= self.outer_radius()
    }

    /// Length of the ring's center line.
    pub fn length(&self) -> f32 {
        TAU * self.radius
    }
}

/// What occupies one orbit of a system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitSlot {
    Planet { ground_height: f32 },
    Belt { half_width: f32 },
}

impl OrbitSlot {
    /// Distance from the slot's inner boundary to its orbit line.
    pub fn reserved(&self) -> f32 {
        match *self {
            OrbitSlot::Planet { ground_height } => PLANET_GAP + ATMOSPHERE_HEIGHT + ground_height,
            OrbitSlot::Belt { half_width } => PLANET_GAP + half_width,
        }
    }
}

/// Random orbit slots for one system. At most one belt, never in the first slot and
/// only in the inner half of the system.
pub fn orbit_slots(count: usize, allow_belt: bool, rng: &mut StdRng) -> Vec<OrbitSlot> {
    let mut belt_created = false;
    (0..count)
        .map(|i| {
            let create_belt = allow_belt
                && !belt_created
                && i > 0
                && (i as f32) < 0.5 * count as f32
                && rng.gen_bool(BELT_CHANCE);
            if create_belt {
                belt_created = true;
                OrbitSlot::Belt {
                    half_width: BELT_HALF_WIDTH,
                }
            } else {
                OrbitSlot::Planet {
                    ground_height: rng.gen_range(0.5..1.0) * MAX_GROUND_HEIGHT,
                }
            }
        })
        .collect()
}

/// Radius a system needs to hold the given slots.
pub fn system_radius(slots: &[OrbitSlot]) -> f32 {
    slots
        .iter()
        .fold(STAR_ZONE_RADIUS, |r, slot| r + 2.0 * slot.reserved())
}

fn random_sign(rng: &mut StdRng) -> f32 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

/// Pick a planet config for the requested difficulty, falling back to medium configs.
pub fn pick_planet_config(
    configs: &[Arc<PlanetConfig>],
    easy: bool,
    hard: bool,
    rng: &mut StdRng,
) -> Result<Arc<PlanetConfig>, GenError> {
    let bucket: Vec<&Arc<PlanetConfig>> = configs.iter().filter(|c| c.suits(easy, hard)).collect();
    if let Some(config) = bucket.choose(rng) {
        return Ok(Arc::clone(config));
    }
    let medium: Vec<&Arc<PlanetConfig>> =
        configs.iter().filter(|c| c.suits(false, false)).collect();
    match medium.choose(rng) {
        Some(config) => {
            log::warn!(
                "No planet config for easy={} hard={}, using {}",
                easy,
                hard,
                config.name
            );
            Ok(Arc::clone(config))
        }
        None => Err(GenError::NoPlanetConfig { easy, hard }),
    }
}

/// Inputs for laying out one system.
pub struct SystemSpec<'a> {
    pub index: usize,
    pub name: String,
    pub position: Vec2,
    pub slots: &'a [OrbitSlot],
    pub config: Arc<SystemConfig>,
    pub hard: bool,
    /// Index the first planet of this system will get in the galaxy.
    pub first_planet: usize,
    /// Index the first belt of this system will get in the galaxy.
    pub first_belt: usize,
}

/// A laid out system with the planets and belts it owns.
#[derive(Debug, Clone)]
pub struct SystemParts {
    pub system: SolarSystem,
    pub planets: Vec<Planet>,
    pub belts: Vec<SystemBelt>,
}

/// Pick a belt config of the requested difficulty, falling back to any config.
pub fn pick_belt_config(
    configs: &[Arc<BeltConfig>],
    hard: bool,
    rng: &mut StdRng,
) -> Result<Arc<BeltConfig>, GenError> {
    let matching: Vec<&Arc<BeltConfig>> = configs.iter().filter(|c| c.hard == hard).collect();
    matching
        .choose(rng)
        .map(|c| Arc::clone(c))
        .or_else(|| configs.choose(rng).cloned())
        .ok_or(GenError::EmptyConfig("belts"))
}

/// Lay out a system's planets and belts on their orbits.
pub fn build_system(
    spec: SystemSpec<'_>,
    planet_configs: &[Arc<PlanetConfig>],
    belt_configs: &[Arc<BeltConfig>],
    planet_names: &[String],
    rng: &mut StdRng,
) -> Result<SystemParts, GenError> {
    let radius = system_radius(spec.slots);
    let mut planets = Vec::with_capacity(spec.slots.len());
    let mut belts = Vec::new();
    let mut dist = STAR_ZONE_RADIUS;

    for slot in spec.slots {
        let reserved = slot.reserved();
        dist += reserved;

        match *slot {
            OrbitSlot::Planet { ground_height: gh } => {
                let inner = dist < radius / 2.0;
                let config =
                    pick_planet_config(planet_configs, !inner && !spec.hard, inner && spec.hard, rng)?;
                let name = planet_names
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| format!("{} {}", spec.name, planets.len() + 1));
                let orbit = Orbit {
                    distance: dist,
                    angle_to_system: rng.gen_range(0.0..TAU),
                    orbit_speed: math::arc_to_angle(PLANET_SPEED, dist) * random_sign(rng),
                    angle: rng.gen_range(0.0..TAU),
                    rotation_speed: math::arc_to_angle(GROUND_SPEED, gh) * random_sign(rng),
                };
                planets.push(Planet::new(name, config, spec.index, spec.position, orbit, gh, rng));
            }
            OrbitSlot::Belt { half_width } => {
                belts.push(SystemBelt {
                    system: spec.index,
                    center: spec.position,
                    radius: dist,
                    half_width,
                    config: pick_belt_config(belt_configs, spec.hard, rng)?,
                });
            }
        }

        dist += reserved;
    }
    debug_assert!((dist - radius).abs() < 0.1);

    let system = SolarSystem {
        name: spec.name,
        position: spec.position,
        radius,
        config: spec.config,
        hard: spec.hard,
        planets: (spec.first_planet..spec.first_planet + planets.len()).collect(),
        belts: (spec.first_belt..spec.first_belt + belts.len()).collect(),
    };
    Ok(SystemParts {
        system,
        planets,
        belts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configs() -> Vec<Arc<PlanetConfig>> {
        crate::config::GalaxyConfig::default()
            .planets
            .into_iter()
            .map(Arc::new)
            .collect()
    }

    fn belt_configs() -> Vec<Arc<BeltConfig>> {
        crate::config::GalaxyConfig::default()
            .belts
            .into_iter()
            .map(Arc::new)
            .collect()
    }

    fn planet_slot(ground_height: f32) -> OrbitSlot {
        OrbitSlot::Planet { ground_height }
    }

    fn spec(slots: &[OrbitSlot]) -> SystemSpec<'_> {
        SystemSpec {
            index: 0,
            name: "Aster".to_string(),
            position: Vec2::ZERO,
            slots,
            config: Arc::new(SystemConfig::default()),
            hard: false,
            first_planet: 0,
            first_belt: 0,
        }
    }

    #[test]
    fn radius_accounts_for_every_planet() {
        let radius = system_radius(&[planet_slot(20.0), planet_slot(15.0)]);
        let expected = STAR_ZONE_RADIUS + 2.0 * (2.0 * PLANET_GAP + 2.0 * ATMOSPHERE_HEIGHT) + 70.0;
        assert!((radius - expected).abs() < 1e-4);

        let belt = OrbitSlot::Belt {
            half_width: BELT_HALF_WIDTH,
        };
        let with_belt = system_radius(&[planet_slot(20.0), belt]);
        let expected = STAR_ZONE_RADIUS
            + 2.0 * (PLANET_GAP + ATMOSPHERE_HEIGHT + 20.0)
            + 2.0 * (PLANET_GAP + BELT_HALF_WIDTH);
        assert!((with_belt - expected).abs() < 1e-4);
    }

    #[test]
    fn orbits_do_not_touch() {
        let mut rng = StdRng::seed_from_u64(3);
        let slots = orbit_slots(5, false, &mut rng);
        let parts = build_system(spec(&slots), &configs(), &belt_configs(), &[], &mut rng).unwrap();
        let (system, planets) = (parts.system, parts.planets);

        assert!(parts.belts.is_empty());
        assert_eq!(system.planets, vec![0, 1, 2, 3, 4]);
        for pair in planets.windows(2) {
            let gap = pair[1].orbit.distance - pair[0].orbit.distance;
            assert!(gap >= pair[0].full_height() + pair[1].full_height() + 2.0 * PLANET_GAP - 1e-3);
        }
        let outer = planets.last().unwrap();
        assert!(outer.orbit.distance + outer.full_height() <= system.radius);
        assert_eq!(planets[0].name, "Aster 1");
    }

    #[test]
    fn belt_sits_between_its_neighbours() {
        let slots = [
            planet_slot(20.0),
            OrbitSlot::Belt {
                half_width: BELT_HALF_WIDTH,
            },
            planet_slot(15.0),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let parts = build_system(spec(&slots), &configs(), &belt_configs(), &[], &mut rng).unwrap();
        assert_eq!(parts.planets.len(), 2);
        assert_eq!(parts.system.belts, vec![0]);
        assert_eq!(parts.planets[1].name, "Aster 2");

        let belt = &parts.belts[0];
        let first = &parts.planets[0];
        let second = &parts.planets[1];
        let expected = STAR_ZONE_RADIUS
            + 2.0 * (PLANET_GAP + ATMOSPHERE_HEIGHT + 20.0)
            + PLANET_GAP
            + BELT_HALF_WIDTH;
        assert!((belt.radius - expected).abs() < 1e-3);
        assert!(!belt.config.hard);

        let gap_before = belt.inner_radius() - (first.orbit.distance + first.full_height());
        let gap_after = (second.orbit.distance - second.full_height()) - belt.outer_radius();
        assert!((gap_before - 2.0 * PLANET_GAP).abs() < 1e-3);
        assert!((gap_after - 2.0 * PLANET_GAP).abs() < 1e-3);
        assert!(second.orbit.distance + second.full_height() <= parts.system.radius + 1e-3);

        assert!(belt.contains(Vec2::new(belt.radius, 0.0)));
        assert!(!belt.contains(Vec2::new(first.orbit.distance, 0.0)));
    }

    #[test]
    fn belts_only_in_inner_half_and_at_most_one() {
        let mut seen = 0;
        for seed in 0..200 {
            let slots = orbit_slots(5, true, &mut StdRng::seed_from_u64(seed));
            let belts: Vec<usize> = slots
                .iter()
                .enumerate()
                .filter(|(_, s)| matches!(s, OrbitSlot::Belt { .. }))
                .map(|(i, _)| i)
                .collect();
            assert!(belts.len() <= 1, "seed {seed}");
            assert!(belts.iter().all(|i| (1..3).contains(i)), "seed {seed}");
            seen += belts.len();
        }
        assert!(seen > 100 && seen < 200, "belts in {seen} of 200 systems");

        let slots = orbit_slots(5, false, &mut StdRng::seed_from_u64(0));
        assert!(slots.iter().all(|s| matches!(s, OrbitSlot::Planet { .. })));
    }

    #[test]
    fn missing_difficulty_falls_back_to_medium() {
        let only_medium = vec![Arc::new(PlanetConfig::default())];
        let mut rng = StdRng::seed_from_u64(0);
        let picked = pick_planet_config(&only_medium, true, false, &mut rng).unwrap();
        assert_eq!(picked.name, "rocky");
        assert!(pick_planet_config(&[], false, true, &mut rng).is_err());
    }
}
