//! Time management for the fixed-timestep simulation loop.

use std::time::{Duration, Instant};

/// Upper bound on fixed steps owed after one long frame, so a stall does not
/// snowball into an ever-growing backlog.
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Manages frame timing and the fixed-step accumulator.
#[derive(Debug)]
pub struct Time {
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Fixed timestep for simulation ticks (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
    /// Fixed ticks consumed since start.
    tick_count: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager ticking at 60 Hz.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// Create a time manager with an explicit fixed step in seconds.
    pub fn with_fixed_step(step_seconds: f32) -> Self {
        Self {
            fixed_timestep: Duration::from_secs_f32(step_seconds),
            ..Self::new()
        }
    }

    /// Update timing at the start of a new frame from the wall clock.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    /// Feed an explicit frame duration into the accumulator.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.accumulator += delta;
        let cap = self.fixed_timestep * MAX_STEPS_PER_FRAME;
        if self.accumulator > cap {
            self.accumulator = cap;
        }
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Number of fixed ticks consumed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Simulated time covered by the consumed ticks, in seconds.
    pub fn simulated_seconds(&self) -> f64 {
        self.tick_count as f64 * self.fixed_timestep.as_secs_f64()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            self.tick_count += 1;
            true
        } else {
            false
        }
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }
}
