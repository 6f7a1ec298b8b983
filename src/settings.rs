//! Arena configuration
//!
//! Authored data only: emitters, the wave schedule, and per-agent tuning.
//! Loaded from JSON, validated once, then turned into runtime state by
//! [`crate::sim::ArenaState::from_config`].

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::locomotion::MovementAxis;
use crate::sim::world::{LayerMask, Tag};

/// Errors produced while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must not be negative (got {value})")]
    Negative { field: String, value: f32 },
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: String, value: f32 },
    #[error("{field} has min {min} greater than max {max}")]
    InvertedRange { field: String, min: f32, max: f32 },
    #[error("emitter name `{0}` is used more than once")]
    DuplicateEmitter(String),
}

/// Closed interval along one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }
}

/// Physical body a projectile prefab instantiates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectilePrefab {
    pub tag: Tag,
    pub layer: u8,
    pub mass: f32,
    pub radius: f32,
    /// A prefab without a physical body cannot be launched
    pub has_body: bool,
}

impl Default for ProjectilePrefab {
    fn default() -> Self {
        Self {
            tag: Tag::DefaultBall,
            layer: 0,
            mass: PROJECTILE_MASS,
            radius: PROJECTILE_RADIUS,
            has_body: true,
        }
    }
}

/// A fixed launch point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub name: String,
    pub position: Vec3,
    /// Facing direction (launch direction before deviation)
    pub forward: Vec3,
    pub up: Vec3,
    pub min_launch_force: f32,
    pub max_launch_force: f32,
    /// Maximum yaw/pitch deviation in degrees
    pub max_angle_deviation: f32,
    pub prefab: ProjectilePrefab,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            name: String::from("emitter"),
            position: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            min_launch_force: 400.0,
            max_launch_force: 600.0,
            max_angle_deviation: 5.0,
            prefab: ProjectilePrefab::default(),
        }
    }
}

/// One (emitter, count) pair inside a wave
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationConfig {
    /// Emitter name; `None` or an unknown name makes the batch a no-op
    pub emitter: Option<String>,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveConfig {
    #[serde(default)]
    pub activations: Vec<ActivationConfig>,
    /// Seconds to wait after activating this wave
    #[serde(default = "default_wait_after")]
    pub wait_after: f32,
}

fn default_wait_after() -> f32 {
    5.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds before the first wave
    pub pre_delay: f32,
    /// Seconds between launches within every batch
    pub launch_interval: f32,
    pub waves: Vec<WaveConfig>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            pre_delay: 2.0,
            launch_interval: 2.0,
            waves: Vec::new(),
        }
    }
}

/// Tuning for one autonomous bot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub name: String,
    pub spawn: Vec3,

    // === Movement ===
    pub move_speed: f32,
    /// Speed boost when a projectile would beat the bot to its position
    pub speed_multiplier: f32,
    pub min_position: f32,
    pub max_position: f32,
    pub movement_axis: MovementAxis,

    // === Attack ===
    pub knockback_radius: f32,
    pub knockback_force: f32,
    pub attack_cooldown: f32,
    /// Layers searched for targets; `None` searches every layer
    pub ball_layer: Option<LayerMask>,
    pub ball_tag: Tag,

    // === AI ===
    pub search_radius: f32,
    pub min_reach_distance: f32,
    #[serde(alias = "auto_attack_range")]
    pub attack_radius: f32,
    /// Reserved, not read by targeting or attack
    pub far_distance_threshold: f32,
    /// Maximum height above the bot for a projectile to be considered
    pub max_ball_height: f32,
    /// Diagnostic: attack every tick, ignoring cooldown and range
    pub always_attack: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: String::from("bot"),
            spawn: Vec3::ZERO,
            move_speed: 6.0,
            speed_multiplier: 1.5,
            min_position: -8.9,
            max_position: 8.9,
            movement_axis: MovementAxis::X,
            knockback_radius: 5.0,
            knockback_force: 1000.0,
            attack_cooldown: 1.5,
            ball_layer: None,
            ball_tag: Tag::DefaultBall,
            search_radius: 15.0,
            min_reach_distance: 0.1,
            attack_radius: 3.0,
            far_distance_threshold: 5.0,
            max_ball_height: 2.0,
            always_attack: false,
        }
    }
}

impl BotConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min_position, self.max_position)
    }
}

/// Tuning for the input-driven player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn: Vec3,
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    pub movement_axis: MovementAxis,
    /// Position limits along the movement axis
    pub move_bounds: Option<Bounds>,
    /// Position limits along the orthogonal planar axis
    pub lateral_bounds: Option<Bounds>,
    pub knockback_radius: f32,
    pub knockback_force: f32,
    pub attack_cooldown: f32,
    pub ball_tag: Tag,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::ZERO,
            move_speed: 7.0,
            sprint_multiplier: 1.6,
            movement_axis: MovementAxis::X,
            move_bounds: Some(Bounds::new(-8.9, 8.9)),
            lateral_bounds: None,
            knockback_radius: 5.0,
            knockback_force: 1000.0,
            attack_cooldown: 1.5,
            ball_tag: Tag::DefaultBall,
        }
    }
}

/// Speed limits enforced on projectiles every fixed tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min: PROJECTILE_MIN_SPEED,
            max: PROJECTILE_MAX_SPEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub floor_height: f32,
    /// Bodies farther than this (planar) from the origin are removed
    pub despawn_distance: f32,
    /// `None` disables the projectile speed limiter
    pub projectile_speed: Option<SpeedLimits>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            floor_height: 0.0,
            despawn_distance: 60.0,
            projectile_speed: Some(SpeedLimits::default()),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// RNG seed for launch randomization
    pub seed: u64,
    pub gravity: f32,
    pub world: WorldConfig,
    pub emitters: Vec<EmitterConfig>,
    pub schedule: ScheduleConfig,
    pub bots: Vec<BotConfig>,
    pub player: Option<PlayerConfig>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            gravity: DEFAULT_GRAVITY,
            world: WorldConfig::default(),
            emitters: Vec::new(),
            schedule: ScheduleConfig::default(),
            bots: Vec::new(),
            player: None,
        }
    }
}

impl ArenaConfig {
    /// Two emitters, two bots guarding perpendicular lines, and a player
    pub fn demo() -> Self {
        let north = EmitterConfig {
            name: String::from("north"),
            position: Vec3::new(0.0, 1.0, 12.0),
            forward: Vec3::NEG_Z,
            ..Default::default()
        };
        let east = EmitterConfig {
            name: String::from("east"),
            position: Vec3::new(12.0, 1.0, 0.0),
            forward: Vec3::NEG_X,
            ..Default::default()
        };

        let activation = |name: &str, count| ActivationConfig {
            emitter: Some(name.to_string()),
            count,
        };

        Self {
            emitters: vec![north, east],
            schedule: ScheduleConfig {
                waves: vec![
                    WaveConfig {
                        activations: vec![activation("north", 3)],
                        wait_after: 5.0,
                    },
                    WaveConfig {
                        activations: vec![activation("north", 2), activation("east", 2)],
                        wait_after: 6.0,
                    },
                ],
                ..Default::default()
            },
            bots: vec![
                BotConfig {
                    name: String::from("south-keeper"),
                    spawn: Vec3::new(0.0, 0.0, -9.0),
                    movement_axis: MovementAxis::X,
                    ..Default::default()
                },
                BotConfig {
                    name: String::from("west-keeper"),
                    spawn: Vec3::new(-9.0, 0.0, 0.0),
                    movement_axis: MovementAxis::Z,
                    ..Default::default()
                },
            ],
            player: Some(PlayerConfig {
                spawn: Vec3::new(0.0, 0.0, 9.0),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded arena config from {} ({} emitters, {} waves, {} bots)",
            path.display(),
            config.emitters.len(),
            config.schedule.waves.len(),
            config.bots.len()
        );
        Ok(config)
    }

    /// Check authored values. An empty wave list is allowed here; the
    /// scheduler reports it at runtime and halts only itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("schedule.pre_delay", self.schedule.pre_delay)?;
        non_negative("schedule.launch_interval", self.schedule.launch_interval)?;
        for (i, wave) in self.schedule.waves.iter().enumerate() {
            non_negative(&format!("schedule.waves[{i}].wait_after"), wave.wait_after)?;
        }

        let mut names: Vec<&str> = Vec::with_capacity(self.emitters.len());
        for emitter in &self.emitters {
            if names.contains(&emitter.name.as_str()) {
                return Err(ConfigError::DuplicateEmitter(emitter.name.clone()));
            }
            names.push(&emitter.name);

            let field = format!("emitters.{}", emitter.name);
            ordered(
                &format!("{field}.launch_force"),
                emitter.min_launch_force,
                emitter.max_launch_force,
            )?;
            non_negative(&format!("{field}.max_angle_deviation"), emitter.max_angle_deviation)?;
            positive(&format!("{field}.prefab.mass"), emitter.prefab.mass)?;
        }

        for bot in &self.bots {
            let field = format!("bots.{}", bot.name);
            ordered(&format!("{field}.position"), bot.min_position, bot.max_position)?;
            non_negative(&format!("{field}.move_speed"), bot.move_speed)?;
            non_negative(&format!("{field}.attack_cooldown"), bot.attack_cooldown)?;
            non_negative(&format!("{field}.search_radius"), bot.search_radius)?;
            non_negative(&format!("{field}.attack_radius"), bot.attack_radius)?;
            non_negative(&format!("{field}.knockback_radius"), bot.knockback_radius)?;
            non_negative(&format!("{field}.min_reach_distance"), bot.min_reach_distance)?;
        }

        if let Some(player) = &self.player {
            non_negative("player.move_speed", player.move_speed)?;
            non_negative("player.attack_cooldown", player.attack_cooldown)?;
            if let Some(b) = player.move_bounds {
                ordered("player.move_bounds", b.min, b.max)?;
            }
            if let Some(b) = player.lateral_bounds {
                ordered("player.lateral_bounds", b.min, b.max)?;
            }
        }

        if let Some(limits) = self.world.projectile_speed {
            ordered("world.projectile_speed", limits.min, limits.max)?;
        }

        Ok(())
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value < 0.0 {
        return Err(ConfigError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value <= 0.0 {
        return Err(ConfigError::NonPositive {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

fn ordered(field: &str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}
