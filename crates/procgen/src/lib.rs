//! Procedural generation for the galaxy: star systems, planets, ground rings and mazes.
//!
//! Everything here is pure data generation driven by an explicit `StdRng`; nothing
//! touches physics or the object tiers. The `game` crate turns the results into
//! streamable objects.

pub mod config;
pub mod error;
pub mod maze;
pub mod placer;
pub mod planet;
pub mod star_system;
pub mod terrain;
pub mod tiles;
pub mod universe;

pub use config::*;
pub use error::*;
pub use maze::*;
pub use placer::*;
pub use planet::*;
pub use star_system::*;
pub use terrain::*;
pub use tiles::*;
pub use universe::*;
