//! Fixed timestep simulation tick
//!
//! Order within a tick:
//! 1. wave scheduler resumes (launches land in the world)
//! 2. bots decide, move, attack
//! 3. player moves and attacks
//! 4. physics integration, then player bounds
//! 5. out-of-arena projectiles removed

use super::state::{ArenaState, SimEvent};
use crate::consts::*;
use crate::input::InputProvider;

/// Advance the arena by one fixed timestep
pub fn tick(state: &mut ArenaState, input: &impl InputProvider, dt: f32) {
    let now = state.time_secs();

    state
        .scheduler
        .advance(now, &mut state.world, &mut state.events);

    for bot in &mut state.bots {
        bot.fixed_update(&mut state.world, now, &mut state.events);
    }

    if let Some(player) = &mut state.player {
        player.fixed_update(&mut state.world, input, now, &mut state.events);
    }

    state.world.integrate(dt);
    if let Some(player) = &state.player {
        player.post_integrate(&mut state.world);
    }

    for body in state.world.despawn_out_of_bounds() {
        state.events.push(SimEvent::Despawned { body });
    }

    state.time_ticks += 1;
}

/// Converts variable frame times into fixed ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many fixed ticks as `frame_dt` covers, capped at
    /// [`MAX_SUBSTEPS`]. Returns the number of ticks run.
    pub fn step_frame(
        &mut self,
        state: &mut ArenaState,
        input: &impl InputProvider,
        frame_dt: f32,
    ) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT);
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::warn!("Dropping {:.3}s of simulation time", self.accumulator);
            self.accumulator = 0.0;
        }
        steps
    }
}

/// Run `seconds` of simulation with a constant input.
///
/// Events are not drained here; they stay in the state until
/// [`ArenaState::drain_events`] is called.
pub fn run_for(state: &mut ArenaState, input: &impl InputProvider, seconds: f32) {
    let ticks = (seconds * SIM_HZ as f32).round() as u64;
    for _ in 0..ticks {
        tick(state, input, SIM_DT);
    }
}
