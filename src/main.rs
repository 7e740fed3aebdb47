//! Squad Brawler headless runner
//!
//! Plays a full campaign in demo mode and logs the outcome. Useful for
//! balance checks against alternative tuning files.
//!
//! Usage: `squad-brawler [seed] [tuning.json]`

use std::process::ExitCode;
use std::sync::Arc;

use squad_brawler::audio::LogAudio;
use squad_brawler::consts::TICK_RATE;
use squad_brawler::narrative::ScriptedNarrator;
use squad_brawler::{GamePhase, Simulation, TickInput, Tuning};

/// Ten simulated minutes
const MAX_TICKS: u64 = 10 * 60 * TICK_RATE as u64;

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        None => 0x5eed,
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            log::error!("Seed must be an unsigned integer: {err}");
            return ExitCode::FAILURE;
        }
    };
    let tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    log::info!("Squad Brawler (headless) starting with seed {seed}");
    let mut sim = Simulation::new(seed, tuning)
        .with_audio(Box::new(LogAudio::new()))
        .with_narrator(Arc::new(ScriptedNarrator));
    sim.start();

    let mut input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let mut ticks = 0;
    while !sim.phase().is_terminal() && ticks < MAX_TICKS {
        if sim.phase() == GamePhase::Warehouse {
            visit_warehouse(&mut sim);
        }
        sim.tick(&mut input);
        ticks += 1;
    }

    let state = sim.state();
    log::info!(
        "Finished in {:?} after {ticks} ticks: level {}, score {}, currency {}, upgrade level {}",
        state.phase,
        state.level,
        state.score,
        state.currency,
        state.player.upgrade_level
    );
    log::info!("Last narrative: {}", state.narrative);
    ExitCode::SUCCESS
}

/// Take every free reward, recruit the ally, move on
fn visit_warehouse(sim: &mut Simulation) {
    let open: Vec<String> = sim
        .state()
        .tasks
        .iter()
        .filter(|t| !t.completed)
        .map(|t| t.id.clone())
        .collect();
    for id in open {
        sim.complete_task(&id);
    }
    sim.recruit_ally();
    sim.close_warehouse();
}
