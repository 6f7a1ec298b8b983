//! Knockback Arena - wave-scheduled projectiles versus autonomous bots
//!
//! Core modules:
//! - `sim`: Deterministic simulation (wave scheduling, targeting, attacks, physics)
//! - `settings`: Data-driven arena configuration
//! - `input`: Player input abstraction

pub mod input;
pub mod settings;
pub mod sim;

pub use input::{InputProvider, TickInput};
pub use settings::{ArenaConfig, ConfigError};

use glam::{Vec2, Vec3};

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation rate
    pub const SIM_HZ: u32 = 50;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Downward acceleration applied to dynamic bodies (units/s²)
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Projectile axis speed below which a target is treated as stationary
    pub const APPROACH_EPSILON: f32 = 0.1;
    /// Speed below which the projectile speed limiter leaves a body alone
    pub const REST_SPEED: f32 = 0.01;

    /// Projectile speed limits
    pub const PROJECTILE_MIN_SPEED: f32 = 5.0;
    pub const PROJECTILE_MAX_SPEED: f32 = 12.0;

    /// Default projectile body
    pub const PROJECTILE_RADIUS: f32 = 0.25;
    pub const PROJECTILE_MASS: f32 = 1.0;

    /// Default agent body
    pub const AGENT_RADIUS: f32 = 0.5;
    pub const AGENT_MASS: f32 = 1.0;
}

/// Project a world position onto the horizontal (x, z) plane
#[inline]
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Distance between two points measured on the x/z plane only
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

/// Sign of `value` as -1, 0 or 1 (zero stays zero)
#[inline]
pub fn step_sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -4.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_step_sign() {
        assert_eq!(step_sign(3.2), 1.0);
        assert_eq!(step_sign(-0.1), -1.0);
        assert_eq!(step_sign(0.0), 0.0);
    }
}
