//! Generation errors.

use thiserror::Error;

/// Failures that abort world generation or a single planet's materialization.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenError {
    /// The spatial placer ran out of sweeps without finding a free spot.
    #[error("no free position for a region of radius {radius} after {sweeps} sweeps")]
    PlacementExhausted { radius: f32, sweeps: u32 },

    /// The ground ring of a planet cannot hold a single column or row.
    #[error("ground height {ground_height} with {rows} rows is too small for a tile ring")]
    InvalidGround { ground_height: f32, rows: usize },

    /// No planet config is eligible for the requested difficulty.
    #[error("no planet config available (easy: {easy}, hard: {hard})")]
    NoPlanetConfig { easy: bool, hard: bool },

    /// A config list the generator needs to pick from is empty.
    #[error("config list `{0}` is empty")]
    EmptyConfig(&'static str),
}
