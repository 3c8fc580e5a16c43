//! Common components used across the engine.

use glam::Vec2;

/// Linear and angular velocity of a moving entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec2,
    pub angular: f32,
}

impl Velocity {
    pub fn new(linear: Vec2) -> Self {
        Self {
            linear,
            angular: 0.0,
        }
    }

    pub fn with_angular(linear: Vec2, angular: f32) -> Self {
        Self { linear, angular }
    }
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percentage(&self) -> f32 {
        self.current / self.max
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Side a ship fights for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Faction {
    /// Stations, traders, the player.
    #[default]
    Friendly,
    /// Planet guards, orbit patrols, maze dwellers.
    Hostile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DamageType {
    #[default]
    Bullet,
    Explosion,
    Crash,
    Fire,
}

/// A single hit applied to a damageable entity.
#[derive(Debug, Clone, Copy)]
pub struct Damage {
    pub amount: f32,
    pub damage_type: DamageType,
}

impl Damage {
    pub fn fire(amount: f32) -> Self {
        Self {
            amount,
            damage_type: DamageType::Fire,
        }
    }
}
