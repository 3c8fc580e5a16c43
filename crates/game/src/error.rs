//! World-level errors.

use procgen::GenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world generation failed: {0}")]
    Generation(#[from] GenError),

    #[error("no tile table named `{0}`")]
    UnknownTileSet(String),

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
}

/// Reasons a settings file is rejected.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("hysteresis margin {0} is negative; demotion would start inside the activation radius")]
    NegativeMargin(f32),

    #[error("view distance {0} must be positive")]
    ViewDistance(f32),

    #[error("timestep {0} must be positive")]
    Timestep(f32),
}
