//! Wave orchestration
//!
//! The scheduler is a queue of timed resumes driven by the simulation clock.
//! Two kinds of task live in the queue:
//! - the sequence, which activates one wave and then sleeps for its `wait_after`
//! - batch jobs, one per (emitter, count) entry, each launching on its own
//!   cadence
//!
//! Every task carries its own state, so batch jobs outlive the wave that
//! started them and overlap freely with later waves. A resume scheduled
//! while the queue is being drained waits for the next `advance`, which keeps
//! zero-length waits from spinning.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use thiserror::Error;

use super::emitter::{LaunchError, Launcher};
use super::state::SimEvent;
use super::world::EmitterId;
use crate::settings::ScheduleConfig;

/// Slack when comparing resume times against the clock (seconds)
const TIME_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("wave schedule has no waves configured")]
    Empty,
}

/// One (emitter, count) entry of a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub emitter: Option<EmitterId>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    pub activations: Vec<Activation>,
    /// Seconds the sequence sleeps after starting this wave's batches
    pub wait_after: f64,
}

/// Ordered waves, replayed forever
#[derive(Debug, Clone, PartialEq)]
pub struct WaveSchedule {
    pub pre_delay: f64,
    /// Shared by every batch job
    pub launch_interval: f64,
    pub waves: Vec<Wave>,
}

impl WaveSchedule {
    /// Build from config, resolving emitter names. Unknown names become
    /// `None` entries, which the scheduler skips.
    pub fn from_config(
        config: &ScheduleConfig,
        resolve: impl Fn(&str) -> Option<EmitterId>,
    ) -> Self {
        let waves = config
            .waves
            .iter()
            .map(|wave| Wave {
                activations: wave
                    .activations
                    .iter()
                    .map(|a| Activation {
                        emitter: a.emitter.as_deref().and_then(&resolve),
                        count: a.count,
                    })
                    .collect(),
                wait_after: f64::from(wave.wait_after.max(0.0)),
            })
            .collect();

        Self {
            pre_delay: f64::from(config.pre_delay.max(0.0)),
            launch_interval: f64::from(config.launch_interval.max(0.0)),
            waves,
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.waves.is_empty() {
            return Err(ScheduleError::Empty);
        }
        Ok(())
    }

    /// Seconds from activating wave 0 to activating wave 0 of the next cycle
    pub fn cycle_duration(&self) -> f64 {
        self.waves.iter().map(|w| w.wait_after).sum()
    }

    /// Launches requested per cycle (entries without an emitter excluded)
    pub fn launches_per_cycle(&self) -> u32 {
        self.waves
            .iter()
            .flat_map(|w| w.activations.iter())
            .filter(|a| a.emitter.is_some())
            .map(|a| a.count)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Not started yet
    Idle,
    /// Sleeping through the pre-delay
    PreDelay,
    /// Last activated wave
    Running { cycle: u64, wave: usize },
    /// Schedule was unusable; agents keep running
    Halted(ScheduleError),
    /// Torn down from outside
    Stopped,
}

#[derive(Debug, Clone)]
struct BatchJob {
    emitter: EmitterId,
    remaining: u32,
    launched: u32,
}

#[derive(Debug, Clone)]
enum Task {
    Begin,
    ActivateWave { cycle: u64, wave: usize },
    Batch(BatchJob),
}

#[derive(Debug, Clone)]
struct Wake {
    at: f64,
    seq: u64,
    task: Task,
}

impl PartialEq for Wake {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Wake {}

impl PartialOrd for Wake {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wake {
    // Reversed so the max-heap pops the earliest resume first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Drives a [`WaveSchedule`] against a [`Launcher`]
#[derive(Debug, Clone)]
pub struct WaveScheduler {
    schedule: WaveSchedule,
    queue: BinaryHeap<Wake>,
    next_seq: u64,
    phase: SchedulerPhase,
}

impl WaveScheduler {
    pub fn new(schedule: WaveSchedule) -> Self {
        Self {
            schedule,
            queue: BinaryHeap::new(),
            next_seq: 0,
            phase: SchedulerPhase::Idle,
        }
    }

    pub fn schedule(&self) -> &WaveSchedule {
        &self.schedule
    }

    pub fn phase(&self) -> &SchedulerPhase {
        &self.phase
    }

    /// Batch jobs still holding launches
    pub fn active_batches(&self) -> usize {
        self.queue
            .iter()
            .filter(|w| matches!(w.task, Task::Batch(_)))
            .count()
    }

    /// Begin the sequence: the first wave activates `pre_delay` after `now`
    pub fn start(&mut self, now: f64) {
        if self.phase != SchedulerPhase::Idle {
            log::warn!("Wave scheduler already started");
            return;
        }
        log::info!(
            "Starting wave sequence in {:.1} seconds",
            self.schedule.pre_delay
        );
        self.phase = SchedulerPhase::PreDelay;
        self.push(now + self.schedule.pre_delay, Task::Begin);
    }

    /// Tear down the sequence and every running batch
    pub fn stop(&mut self) {
        self.queue.clear();
        self.phase = SchedulerPhase::Stopped;
        log::info!("Wave scheduler stopped");
    }

    /// Run every resume due at `now`
    pub fn advance(&mut self, now: f64, launcher: &mut impl Launcher, events: &mut Vec<SimEvent>) {
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|w| w.at <= now + TIME_EPSILON)
        {
            if let Some(wake) = self.queue.pop() {
                due.push(wake);
            }
        }

        for wake in due {
            match wake.task {
                Task::Begin => self.begin(wake.at, launcher, events),
                Task::ActivateWave { cycle, wave } => {
                    self.activate_wave(wake.at, cycle, wave, launcher, events)
                }
                Task::Batch(job) => self.step_batch(wake.at, job, launcher, events),
            }
        }
    }

    fn push(&mut self, at: f64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Wake { at, seq, task });
    }

    fn begin(&mut self, at: f64, launcher: &mut impl Launcher, events: &mut Vec<SimEvent>) {
        if let Err(err) = self.schedule.validate() {
            log::error!("Wave sequence halted: {err}");
            self.phase = SchedulerPhase::Halted(err.clone());
            events.push(SimEvent::ScheduleHalted(err));
            return;
        }
        self.activate_wave(at, 0, 0, launcher, events);
    }

    fn activate_wave(
        &mut self,
        at: f64,
        cycle: u64,
        wave: usize,
        launcher: &mut impl Launcher,
        events: &mut Vec<SimEvent>,
    ) {
        let wave_count = self.schedule.waves.len();
        if wave == 0 {
            if cycle > 0 {
                log::info!("Wave cycle {} complete, restarting from the first wave", cycle - 1);
                events.push(SimEvent::CycleCompleted { cycle: cycle - 1 });
            }
            log::info!("Starting wave cycle {cycle} ({wave_count} waves)");
        }

        let Some(current) = self.schedule.waves.get(wave).cloned() else {
            return;
        };
        log::info!("Wave {} of cycle {cycle} started", wave + 1);
        self.phase = SchedulerPhase::Running { cycle, wave };
        events.push(SimEvent::WaveStarted { cycle, wave });

        for (entry, activation) in current.activations.iter().enumerate() {
            let emitter = match activation.emitter {
                Some(id) if launcher.has_emitter(id) => id,
                _ => {
                    log::warn!(
                        "Wave {} entry {entry}: emitter unavailable, batch skipped",
                        wave + 1
                    );
                    events.push(SimEvent::BatchSkipped { wave, entry });
                    continue;
                }
            };
            let job = BatchJob {
                emitter,
                remaining: activation.count,
                launched: 0,
            };
            // First launch happens at activation, not one interval later
            self.step_batch(at, job, launcher, events);
        }

        let (next_cycle, next_wave) = if wave + 1 < wave_count {
            (cycle, wave + 1)
        } else {
            (cycle + 1, 0)
        };
        log::debug!("Waiting {:.1} seconds before the next wave", current.wait_after);
        self.push(
            at + current.wait_after,
            Task::ActivateWave {
                cycle: next_cycle,
                wave: next_wave,
            },
        );
    }

    fn step_batch(
        &mut self,
        at: f64,
        mut job: BatchJob,
        launcher: &mut impl Launcher,
        events: &mut Vec<SimEvent>,
    ) {
        if job.remaining > 0 {
            job.remaining -= 1;
            match launcher.launch(job.emitter) {
                Ok(body) => {
                    job.launched += 1;
                    events.push(SimEvent::Launched {
                        emitter: job.emitter,
                        body,
                    });
                }
                Err(error @ LaunchError::UnknownEmitter(_)) => {
                    // Same skip as at activation: the rest of the batch is dropped
                    log::warn!("{error}, ending batch with {} launches left", job.remaining);
                    events.push(SimEvent::LaunchFailed {
                        emitter: job.emitter,
                        error,
                    });
                    job.remaining = 0;
                }
                Err(error) => events.push(SimEvent::LaunchFailed {
                    emitter: job.emitter,
                    error,
                }),
            }
        }

        if job.remaining > 0 {
            let interval = self.schedule.launch_interval;
            self.push(at + interval, Task::Batch(job));
        } else {
            log::debug!("Emitter {:?} finished its batch", job.emitter);
            events.push(SimEvent::BatchCompleted {
                emitter: job.emitter,
                launches: job.launched,
            });
        }
    }
}
