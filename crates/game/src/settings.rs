//! Simulation settings. Loaded from `world.ron` at startup.

use crate::error::SettingsError;
use procgen::GalaxyConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables of the running simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed step in seconds.
    pub timestep: f32,
    /// Half the visible extent of the camera. Objects within 1.5x of it are simulated.
    pub view_distance: f32,
    /// Extra fraction of the activation distance an object must pass before it is
    /// demoted again.
    pub hysteresis_margin: f32,
    pub star_grav_const: f32,
    /// Star fire damage per second inside the hot radius.
    pub star_damage: f32,
    /// Distance past the atmosphere edge where embedded ships are put back.
    pub recovery_margin: f32,
    /// A maze builds when the camera is this many view distances from its edge.
    pub maze_trigger: f32,
    /// Sprite variants generated per tile transition.
    pub tile_variants: usize,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.hysteresis_margin.is_nan() || self.hysteresis_margin < 0.0 {
            return Err(SettingsError::NegativeMargin(self.hysteresis_margin));
        }
        if self.view_distance.is_nan() || self.view_distance <= 0.0 {
            return Err(SettingsError::ViewDistance(self.view_distance));
        }
        if self.timestep.is_nan() || self.timestep <= 0.0 {
            return Err(SettingsError::Timestep(self.timestep));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            view_distance: 24.0,
            hysteresis_margin: 0.33,
            star_grav_const: procgen::STAR_GRAV_CONST,
            star_damage: procgen::STAR_DAMAGE,
            recovery_margin: 1.0,
            maze_trigger: 2.0,
            tile_variants: 3,
        }
    }
}

/// Everything the binary needs to build and run a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub seed: u64,
    pub galaxy: GalaxyConfig,
    pub sim: SimConfig,
    /// Ticks the headless demo runs for.
    pub ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 1,
            galaxy: GalaxyConfig::default(),
            sim: SimConfig::default(),
            ticks: 3600,
        }
    }
}

impl Settings {
    /// Load settings from `world.ron`. If the file is missing or invalid, returns defaults.
    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match Self::parse(&data) {
                Ok(s) => return s,
                Err(e) => log::warn!("Invalid settings at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Parse and validate RON settings text.
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.sim.validate()
    }

    /// Save current settings to `world.ron`. Logs on error.
    pub fn save(&self) {
        let path = settings_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write settings to {:?}: {}", path, e);
            }
        }
    }
}

fn settings_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("world.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/world.ron"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_settings_keep_defaults() {
        let settings: Settings = ron::from_str("(seed: 99, sim: (view_distance: 10.0))").unwrap();
        assert_eq!(settings.seed, 99);
        assert_eq!(settings.sim.view_distance, 10.0);
        assert_eq!(settings.sim.hysteresis_margin, 0.33);
        assert_eq!(settings.galaxy.system_count, 2);
    }

    #[test]
    fn negative_margin_is_rejected() {
        let err = Settings::parse("(sim: (hysteresis_margin: -0.5))").unwrap_err();
        assert!(matches!(err, SettingsError::NegativeMargin(m) if m == -0.5));
        assert!(Settings::parse("(sim: (hysteresis_margin: 0.0))").is_ok());
        assert!(Settings::parse("(sim: (view_distance: 0.0))").is_err());
        assert!(Settings::parse("(sim: (timestep: -1.0))").is_err());
        assert!(matches!(Settings::parse("(seed: )"), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("world-{}.ron", std::process::id()));
        std::fs::write(&path, "(seed: 7, sim: (hysteresis_margin: -1.0))").unwrap();
        let settings = Settings::load_from(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_survive_pretty_ron() {
        let text =
            ron::ser::to_string_pretty(&Settings::default(), ron::ser::PrettyConfig::default())
                .unwrap();
        let back: Settings = ron::from_str(&text).unwrap();
        assert_eq!(back, Settings::default());
    }
}
