//! Arena state and simulation events
//!
//! Everything a fixed tick reads or writes lives here.

use super::agent::{BotController, PlayerController};
use super::emitter::LaunchError;
use super::schedule::{ScheduleError, WaveSchedule, WaveScheduler};
use super::world::{BodyId, EmitterId, World};
use crate::consts::SIM_HZ;
use crate::settings::ArenaConfig;

/// Something observable that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    WaveStarted { cycle: u64, wave: usize },
    CycleCompleted { cycle: u64 },
    ScheduleHalted(ScheduleError),
    /// Entry had no reachable emitter
    BatchSkipped { wave: usize, entry: usize },
    Launched { emitter: EmitterId, body: BodyId },
    LaunchFailed { emitter: EmitterId, error: LaunchError },
    BatchCompleted { emitter: EmitterId, launches: u32 },
    Attack { agent: BodyId, hits: Vec<BodyId>, forced: bool },
    Despawned { body: BodyId },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct ArenaState {
    pub world: World,
    pub scheduler: WaveScheduler,
    pub bots: Vec<BotController>,
    pub player: Option<PlayerController>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events recorded since the last drain. Grows every tick until the
    /// owner calls [`ArenaState::drain_events`].
    pub(crate) events: Vec<SimEvent>,
}

impl ArenaState {
    /// Build the world, agents and scheduler; the scheduler starts at t = 0
    pub fn from_config(config: &ArenaConfig) -> Self {
        let mut world = World::from_config(config);
        let schedule = WaveSchedule::from_config(&config.schedule, |name| world.emitter_id(name));
        for (i, wave) in schedule.waves.iter().enumerate() {
            for (entry, activation) in wave.activations.iter().enumerate() {
                if activation.emitter.is_none() {
                    log::warn!("Wave {} entry {entry} does not name a known emitter", i + 1);
                }
            }
        }

        let bots = config
            .bots
            .iter()
            .map(|bot| BotController::spawn(&mut world, bot))
            .collect();
        let player = config
            .player
            .as_ref()
            .map(|player| PlayerController::spawn(&mut world, player));

        let mut scheduler = WaveScheduler::new(schedule);
        scheduler.start(0.0);

        Self {
            world,
            scheduler,
            bots,
            player,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Simulation clock in seconds
    pub fn time_secs(&self) -> f64 {
        self.time_ticks as f64 / f64::from(SIM_HZ)
    }

    pub fn bot(&self, name: &str) -> Option<&BotController> {
        self.bots.iter().find(|b| b.name == name)
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
