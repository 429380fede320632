//! Presentation intents
//!
//! The engine's only output. Each engine call appends intents in the order
//! they happened; the presentation layer drains and plays them.

use serde::Serialize;

use super::rules::{AxeTier, ChopQuality, Theme, UpgradeEffect};
use super::state::LogId;

/// Why a log was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MissCause {
    /// Tapped while the log was still falling
    Early,
    /// Left on the block until the decay timer ran out
    Timeout,
}

impl MissCause {
    pub fn feedback(&self) -> (&'static str, &'static str) {
        match self {
            MissCause::Early => ("TOO EARLY!", "#ff6060"),
            MissCause::Timeout => ("MISS!", "#ff6060"),
        }
    }
}

/// Something the presentation layer should show or play
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Intent {
    SessionStarted { high_score: u64 },
    LogDropped { log_id: u64, drop_time_ms: f64 },
    LogChoppable { log_id: u64 },
    LogLanded { log_id: u64 },
    /// The axe swings on every tap, scored or not
    AxeSwung,
    ChopResolved { quality: ChopQuality, points: u64 },
    LogSplit,
    MissOccurred { cause: MissCause },
    Feedback { text: &'static str, color: &'static str },
    ScoreChanged { value: u64 },
    StreakChanged { value: u32 },
    StreakMilestone { streak: u32 },
    MultiplierChanged { value: u32 },
    ThemeChanged { theme: Theme },
    AxeTierPromoted { tier: AxeTier, effect: UpgradeEffect },
    AxeTierReset,
    LivesChanged { value: u8 },
    GameOver {
        final_score: u64,
        is_new_high_score: bool,
        best_streak: u32,
        high_score: u64,
    },
    Restarting,
}

impl Intent {
    pub(crate) fn log_dropped(id: LogId, drop_time_ms: f64) -> Self {
        Intent::LogDropped {
            log_id: id.0,
            drop_time_ms,
        }
    }

    pub(crate) fn feedback((text, color): (&'static str, &'static str)) -> Self {
        Intent::Feedback { text, color }
    }
}
