//! Stellar Drift world core.
//!
//! Owns the generated galaxy and streams its contents between a lightweight far
//! tier and a physics-backed near tier as the camera moves, applying planet and star
//! gravity to everything that is simulated.

pub mod drawables;
pub mod error;
pub mod events;
pub mod gravity;
pub mod maze_builder;
pub mod object_manager;
pub mod objects;
pub mod placement;
pub mod settings;
pub mod surface;
pub mod world;

pub use error::{SettingsError, WorldError};
pub use events::WorldEvent;
pub use settings::{Settings, SimConfig};
pub use world::World;
