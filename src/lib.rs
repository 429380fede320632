//! Choppy Wood - a log-chopping reflex arcade game
//!
//! Core modules:
//! - `sim`: Chop timing engine (log lifecycle, scoring, difficulty, lives)
//! - `scheduler`: One-shot timer abstraction and a deterministic virtual clock
//! - `highscores`: Best-effort high score persistence
//! - `settings`: Startup settings and dev flags
//!
//! The engine never renders or plays anything itself. It emits [`sim::Intent`]
//! values that a presentation layer drains and reacts to.

pub mod highscores;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use highscores::{HighScoreStore, JsonFileStore, MemoryStore};
pub use scheduler::{Scheduler, Timer, TimerHandle, VirtualScheduler};
pub use settings::Settings;
pub use sim::{ChopEngine, Intent};

/// Game balance constants
///
/// Fixed for behavioral parity; none of these are configurable.
pub mod consts {
    /// Lives at the start of a session
    pub const MAX_LIVES: u8 = 3;

    /// Fall duration of the first log (ms)
    pub const BASE_DROP_TIME_MS: f64 = 1000.0;
    /// Fastest possible fall duration (ms)
    pub const MIN_DROP_TIME_MS: f64 = 280.0;
    /// Fall duration shaved off per successful chop (ms)
    pub const DROP_TIME_STEP_MS: f64 = 15.0;
    /// Fraction of the fall after which the log becomes choppable
    pub const CHOPPABLE_FRACTION: f64 = 0.8;

    /// Time a landed log waits on the block before it counts as a miss (ms)
    pub const DECAY_MS: f64 = 300.0;
    /// Delay before the next log after a successful chop (ms)
    pub const CHOP_COOLDOWN_MS: f64 = 400.0;
    /// Delay before the next log after a miss (ms)
    pub const MISS_COOLDOWN_MS: f64 = 600.0;
    /// Delay between session start and the first log (ms)
    pub const FIRST_DROP_DELAY_MS: f64 = 1000.0;
    /// Delay between a restart request and the fresh session (ms)
    pub const RESTART_DELAY_MS: f64 = 100.0;

    /// Half-width of the PERFECT window around landing (ms)
    pub const PERFECT_WINDOW_MS: f64 = 40.0;
    /// Half-width of the GOOD window around landing (ms)
    pub const GOOD_WINDOW_MS: f64 = 100.0;
    /// Timing window widening per axe tier (5%)
    pub const TIER_WINDOW_BONUS: f64 = 0.05;

    /// Streak values that play the milestone chime
    pub const STREAK_MILESTONES: [u32; 5] = [5, 10, 25, 50, 100];

    /// Storage key of the persisted high score
    pub const HIGH_SCORE_KEY: &str = "choppywood_highscore";
}
