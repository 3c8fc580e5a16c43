//! Parsed world configuration: planet types, system types, mazes and ship templates.
//!
//! The generator only consumes these structures. They derive `serde` so the binary can
//! read them from RON, and every type has a built-in default so tests and the demo run
//! without data files.

use serde::{Deserialize, Serialize};

/// Broad hull category. Stations sit on planet surfaces and never get recovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullKind {
    #[default]
    Standard,
    Station,
    Big,
}

/// Static description of a ship hull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullConfig {
    pub name: String,
    /// Sprite size in world units.
    pub size: f32,
    /// Radius of the collision circle.
    pub approx_radius: f32,
    pub kind: HullKind,
    pub max_life: f32,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            name: "scout".to_string(),
            size: 1.2,
            approx_radius: 0.6,
            kind: HullKind::Standard,
            max_life: 30.0,
        }
    }
}

impl HullConfig {
    pub fn new(name: &str, size: f32, kind: HullKind, max_life: f32) -> Self {
        Self {
            name: name.to_string(),
            size,
            approx_radius: size / 2.0,
            kind,
            max_life,
        }
    }

    pub fn is_station(&self) -> bool {
        self.kind == HullKind::Station
    }
}

/// A hull together with its spawn density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTemplate {
    pub hull: HullConfig,
    /// Ships per unit of the quantity the spawner scales by (length, area, height).
    pub density: f32,
}

impl Default for ShipTemplate {
    fn default() -> Self {
        Self {
            hull: HullConfig::default(),
            density: 0.05,
        }
    }
}

impl ShipTemplate {
    pub fn new(hull: HullConfig, density: f32) -> Self {
        Self { hull, density }
    }
}

/// Surface decoration sprites (rocks, plants) scattered on planet ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoConfig {
    pub sprites: Vec<String>,
    /// Decorations per unit of ground circumference.
    pub density: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub allow_flip: bool,
}

impl Default for DecoConfig {
    fn default() -> Self {
        Self {
            sprites: vec!["rock".to_string()],
            density: 0.3,
            size_min: 0.4,
            size_max: 1.2,
            allow_flip: true,
        }
    }
}

/// Everything needed to materialize one planet type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub name: String,
    /// Surface acceleration range; the planet's constant is this times ground height squared.
    pub min_grav: f32,
    pub max_grav: f32,
    pub deco: Vec<DecoConfig>,
    pub ground_enemies: Vec<ShipTemplate>,
    pub low_orbit_enemies: Vec<ShipTemplate>,
    pub high_orbit_enemies: Vec<ShipTemplate>,
    pub station: Option<ShipTemplate>,
    pub cloud_sprites: Vec<String>,
    pub tile_set: String,
    pub row_count: usize,
    pub smooth_landscape: bool,
    pub carve_tunnels: bool,
    pub easy_only: bool,
    pub hard_only: bool,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            name: "rocky".to_string(),
            min_grav: 0.4,
            max_grav: 0.6,
            deco: vec![DecoConfig::default()],
            ground_enemies: vec![ShipTemplate::new(
                HullConfig::new("guardian", 1.6, HullKind::Standard, 60.0),
                0.1,
            )],
            low_orbit_enemies: vec![ShipTemplate::new(HullConfig::default(), 0.02)],
            high_orbit_enemies: vec![ShipTemplate::new(HullConfig::default(), 0.01)],
            station: Some(ShipTemplate::new(
                HullConfig::new("outpost", 6.0, HullKind::Station, 600.0),
                1.0,
            )),
            cloud_sprites: vec!["cloud".to_string()],
            tile_set: "rocky".to_string(),
            row_count: 6,
            smooth_landscape: true,
            carve_tunnels: false,
            easy_only: false,
            hard_only: false,
        }
    }
}

impl PlanetConfig {
    /// Whether this config may be used for a planet of the given difficulty.
    pub fn suits(&self, easy: bool, hard: bool) -> bool {
        if easy {
            self.easy_only
        } else if hard {
            self.hard_only
        } else {
            !self.easy_only && !self.hard_only
        }
    }
}

/// Star system type: free-space enemies patrolling between the planets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub name: String,
    pub space_enemies: Vec<ShipTemplate>,
    pub hard: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "quiet".to_string(),
            space_enemies: vec![ShipTemplate::new(HullConfig::default(), 0.02)],
            hard: false,
        }
    }
}

/// Asteroid belt type: ships patrolling the ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltConfig {
    pub name: String,
    /// Ships per unit of the ring's center line.
    pub enemies: Vec<ShipTemplate>,
    pub hard: bool,
}

impl Default for BeltConfig {
    fn default() -> Self {
        Self {
            name: "rubble".to_string(),
            enemies: vec![ShipTemplate::new(HullConfig::default(), 0.01)],
            hard: false,
        }
    }
}

/// Maze type: tile set and garrison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub name: String,
    pub tile_set: String,
    /// Ships per unit of the outer ring's circumference.
    pub outer_enemies: Vec<ShipTemplate>,
    /// Ships per unit of the inner area.
    pub inner_enemies: Vec<ShipTemplate>,
    pub bosses: Vec<HullConfig>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            name: "ruins".to_string(),
            tile_set: "ruins".to_string(),
            outer_enemies: vec![ShipTemplate::new(HullConfig::default(), 0.05)],
            inner_enemies: vec![ShipTemplate::new(HullConfig::default(), 0.004)],
            bosses: vec![HullConfig::new("warden", 4.0, HullKind::Big, 800.0)],
        }
    }
}

/// Root of the world configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    pub system_count: usize,
    pub maze_count: usize,
    pub planets_per_system: usize,
    /// Upper bound on spatial placer sweeps before generation gives up.
    pub max_sweeps: u32,
    pub planets: Vec<PlanetConfig>,
    pub systems: Vec<SystemConfig>,
    /// Empty disables belts.
    pub belts: Vec<BeltConfig>,
    pub mazes: Vec<MazeConfig>,
    pub planet_names: Vec<String>,
    pub system_names: Vec<String>,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        let desert = PlanetConfig {
            name: "desert".to_string(),
            tile_set: "desert".to_string(),
            min_grav: 0.3,
            max_grav: 0.5,
            easy_only: true,
            station: None,
            ..PlanetConfig::default()
        };
        let ice = PlanetConfig {
            name: "ice".to_string(),
            tile_set: "ice".to_string(),
            min_grav: 0.5,
            max_grav: 0.8,
            hard_only: true,
            carve_tunnels: true,
            ..PlanetConfig::default()
        };
        let hostile = SystemConfig {
            name: "contested".to_string(),
            space_enemies: vec![ShipTemplate::new(HullConfig::default(), 0.05)],
            hard: true,
        };
        let scrapyard = BeltConfig {
            name: "scrapyard".to_string(),
            enemies: vec![ShipTemplate::new(
                HullConfig::new("raider", 1.4, HullKind::Standard, 45.0),
                0.02,
            )],
            hard: true,
        };

        Self {
            system_count: 2,
            maze_count: 4,
            planets_per_system: 5,
            max_sweeps: 10_000,
            planets: vec![PlanetConfig::default(), desert, ice],
            systems: vec![SystemConfig::default(), hostile],
            belts: vec![BeltConfig::default(), scrapyard],
            mazes: vec![MazeConfig::default()],
            planet_names: ["Vesta", "Orrin", "Kalda", "Myre", "Tessel", "Brannock", "Halo", "Quill"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            system_names: ["Aster", "Corvin", "Lumen", "Pyx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl GalaxyConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}
