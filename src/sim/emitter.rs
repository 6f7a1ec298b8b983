//! Projectile emitters
//!
//! An emitter is a fixed launch point. Each launch spawns one projectile and
//! gives it an impulse of random strength, aimed along the emitter's facing
//! with a small random yaw and pitch.

use glam::{Quat, Vec3};
use rand::Rng;
use thiserror::Error;

use super::world::{Body, BodyId, EmitterId, World};
use crate::settings::{EmitterConfig, ProjectilePrefab};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("emitter {0:?} is not registered")]
    UnknownEmitter(EmitterId),
    #[error("emitter `{0}` prefab has no physical body, cannot apply launch impulse")]
    MissingBody(String),
}

/// Something that can fire an emitter by handle
pub trait Launcher {
    /// Whether the emitter can currently be reached
    fn has_emitter(&self, emitter: EmitterId) -> bool;
    /// Fire one projectile
    fn launch(&mut self, emitter: EmitterId) -> Result<BodyId, LaunchError>;
}

#[derive(Debug, Clone)]
pub struct Emitter {
    pub name: String,
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub min_force: f32,
    pub max_force: f32,
    /// Degrees
    pub max_angle_deviation: f32,
    pub prefab: ProjectilePrefab,
}

impl Emitter {
    pub fn from_config(config: &EmitterConfig) -> Self {
        Self {
            name: config.name.clone(),
            position: config.position,
            forward: config.forward.normalize_or(Vec3::NEG_Z),
            up: config.up.normalize_or(Vec3::Y),
            min_force: config.min_launch_force,
            max_force: config.max_launch_force,
            max_angle_deviation: config.max_angle_deviation,
            prefab: config.prefab.clone(),
        }
    }

    /// Facing rotated by `yaw` degrees around up, after `pitch` degrees around right
    pub fn launch_direction(&self, yaw: f32, pitch: f32) -> Vec3 {
        let right = self.up.cross(self.forward).try_normalize().unwrap_or(Vec3::X);
        let yaw = Quat::from_axis_angle(self.up, yaw.to_radians());
        let pitch = Quat::from_axis_angle(right, pitch.to_radians());
        yaw * pitch * self.forward
    }

    /// Random launch impulse within the configured force and angle bounds
    pub fn sample_impulse(&self, rng: &mut impl Rng) -> Vec3 {
        let force = if self.max_force > self.min_force {
            rng.random_range(self.min_force..=self.max_force)
        } else {
            self.min_force
        };
        let dev = self.max_angle_deviation.abs();
        let (yaw, pitch) = if dev > 0.0 {
            (rng.random_range(-dev..=dev), rng.random_range(-dev..=dev))
        } else {
            (0.0, 0.0)
        };
        self.launch_direction(yaw, pitch) * force
    }
}

impl Launcher for World {
    fn has_emitter(&self, emitter: EmitterId) -> bool {
        self.emitter(emitter).is_some()
    }

    fn launch(&mut self, emitter: EmitterId) -> Result<BodyId, LaunchError> {
        let Some(source) = self.emitter(emitter) else {
            return Err(LaunchError::UnknownEmitter(emitter));
        };
        if !source.prefab.has_body {
            let err = LaunchError::MissingBody(source.name.clone());
            log::error!("{err}");
            return Err(err);
        }

        let source = source.clone();
        let impulse = source.sample_impulse(&mut self.rng);

        let mut body = Body::projectile(source.position, source.prefab.tag);
        body.layer = source.prefab.layer;
        body.mass = source.prefab.mass;
        body.radius = source.prefab.radius;

        let id = self.insert(body);
        self.add_impulse(id, impulse);
        Ok(id)
    }
}
