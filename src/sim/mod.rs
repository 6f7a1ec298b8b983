//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering or platform dependencies

pub mod agent;
pub mod attack;
pub mod emitter;
pub mod locomotion;
pub mod schedule;
pub mod state;
pub mod targeting;
pub mod tick;
pub mod world;

pub use agent::{BotController, PlayerController};
pub use attack::{AttackGate, AttackOutcome, GateState, Knockback};
pub use emitter::{Emitter, LaunchError, Launcher};
pub use locomotion::{Locomotion, MovementAxis};
pub use schedule::{Activation, ScheduleError, SchedulerPhase, Wave, WaveSchedule, WaveScheduler};
pub use state::{ArenaState, SimEvent};
pub use targeting::{MoveCommand, TargetingParams};
pub use tick::{FrameClock, run_for, tick};
pub use world::{Body, BodyId, BodyKind, EmitterId, LayerMask, Tag, World};
