//! Physics service for Stellar Drift, backed by Rapier2D.
//!
//! The world core treats bodies as opaque handles: it creates them, reads and
//! writes their transform and velocity, applies impulses, ray-casts against
//! their colliders and finally destroys them.

pub mod collision;
pub mod physics_world;
pub mod raycast;

pub use collision::*;
pub use physics_world::*;
pub use raycast::*;

// Re-export Rapier for downstream crates
pub use rapier2d;

// Re-export common Rapier types
pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};
