//! Choppy Wood headless runner
//!
//! Plays one session on the virtual clock with a seeded bot and reports
//! every intent through the logger. Handy for balance checks without a
//! renderer: `RUST_LOG=debug choppy-wood 1234`.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use choppy_wood::highscores::JsonFileStore;
use choppy_wood::sim::{ChopEngine, Intent, LogId};
use choppy_wood::{Scheduler, Settings, VirtualScheduler};

/// Frame step of the headless loop (ms)
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Stop after this much virtual time even if the bot is still alive
const MAX_RUN_MS: f64 = 30.0 * 60.0 * 1000.0;

type Engine = ChopEngine<VirtualScheduler, JsonFileStore>;

/// Simulated player: aims at the landing time with some human error
struct Bot {
    rng: Pcg32,
    planned: Option<(LogId, f64)>,
}

impl Bot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            planned: None,
        }
    }

    /// Tap time for the live log, planned once per log
    fn tap_time(&mut self, engine: &Engine) -> Option<f64> {
        let session = engine.session();
        let log = session.log.as_ref()?;
        if session.input_locked {
            return None;
        }
        match self.planned {
            Some((id, at)) if id == log.id => Some(at),
            _ => {
                // Error grows as the logs speed up
                let spread = 40.0 + f64::from(session.streak) * 1.2;
                let offset = self.rng.random_range(-spread..spread)
                    + self.rng.random_range(-spread..spread) * 0.5;
                let at = log.landing_time + offset;
                self.planned = Some((log.id, at));
                Some(at)
            }
        }
    }
}

fn present(intent: &Intent) {
    match intent {
        Intent::ThemeChanged { theme } => log::info!("Sky: {}", theme.as_str()),
        Intent::ChopResolved { .. }
        | Intent::MissOccurred { .. }
        | Intent::AxeTierPromoted { .. }
        | Intent::LivesChanged { .. }
        | Intent::GameOver { .. } => log::info!("{:?}", intent),
        _ => {}
    }
    if log::log_enabled!(log::Level::Debug) {
        match serde_json::to_string(intent) {
            Ok(json) => log::debug!("{}", json),
            Err(e) => log::warn!("Could not encode intent: {}", e),
        }
    }
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    let settings = Settings::load(Path::new(Settings::FILE_NAME));
    log::info!("Choppy Wood (headless) starting, seed {}", seed);

    let store = JsonFileStore::new(&settings.high_score_path);
    let mut engine = ChopEngine::new(VirtualScheduler::new(), store, &settings);
    let mut bot = Bot::new(seed);
    engine.start();

    while !engine.session().game_over {
        let now = engine.scheduler().now();
        if now >= MAX_RUN_MS {
            log::warn!("Stopping after {:.0} s of play", now / 1000.0);
            break;
        }

        let frame_end = now + FRAME_MS;
        if let Some(at) = bot.tap_time(&engine).filter(|at| *at <= frame_end) {
            engine.advance_to(at);
            engine.tap();
        }
        engine.advance_to(frame_end);

        for intent in engine.drain_intents() {
            present(&intent);
        }
    }

    let s = engine.session();
    println!("\nFinal score: {}", s.score);
    println!("Best streak: {}", s.best_streak);
    println!("High score:  {}", s.high_score);
    println!("Axe tier:    {:?}", s.axe_tier);
}
