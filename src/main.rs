//! Knockback Arena headless runner
//!
//! Runs the arena at a fixed rate with idle player input and logs what the
//! waves and bots do. Set `ARENA_CONFIG` to a JSON file to replace the
//! built-in demo arena, and `RUST_LOG` to control verbosity.

use knockback_arena::consts::SIM_DT;
use knockback_arena::sim::{ArenaState, FrameClock, SimEvent};
use knockback_arena::{ArenaConfig, TickInput};

/// Simulated seconds per run
const RUN_SECONDS: u32 = 60;
/// Simulated frame time fed to the frame clock (60 fps)
const FRAME_DT: f32 = 1.0 / 60.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Knockback Arena (headless) starting...");

    let config = match std::env::var("ARENA_CONFIG") {
        Ok(path) => match ArenaConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        Err(_) => ArenaConfig::demo(),
    };

    let mut state = ArenaState::from_config(&config);
    let mut clock = FrameClock::new();
    let input = TickInput::default();

    let mut launched = 0usize;
    let mut attacks = 0usize;
    let mut knocked = 0usize;
    let mut last_report = 0u64;

    let frames = (RUN_SECONDS as f32 / FRAME_DT).round() as u32;
    for _ in 0..frames {
        clock.step_frame(&mut state, &input, FRAME_DT);

        for event in state.drain_events() {
            match event {
                SimEvent::Launched { .. } => launched += 1,
                SimEvent::Attack { hits, .. } => {
                    attacks += 1;
                    knocked += hits.len();
                }
                _ => {}
            }
        }

        let seconds = state.time_secs() as u64;
        if seconds >= last_report + 10 {
            last_report = seconds;
            log::info!(
                "t={seconds}s: {launched} launched, {attacks} attacks, \
                 {knocked} knockbacks, {} in play",
                state.world.projectile_count()
            );
        }
    }

    log::info!(
        "Finished {} ticks ({:.1}s at dt={SIM_DT})",
        state.time_ticks,
        state.time_secs()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}
