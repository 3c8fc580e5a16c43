//! Core engine types and utilities for Stellar Drift.
//!
//! This crate provides the foundational types used across all engine systems:
//! - 2D angle and rotation helpers
//! - Transform and its GPU instance form
//! - Time management for the fixed-timestep loop
//! - Common component types shared by ships and world objects

pub mod components;
pub mod math;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat3, Vec2};
