//! Chop timing simulation
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Time only comes from the scheduler
//! - State changes only in response to a tap or a fired timer
//! - No rendering, audio or platform dependencies

pub mod engine;
pub mod intent;
pub mod rules;
pub mod state;

pub use engine::{ChopEngine, DevCommand};
pub use intent::{Intent, MissCause};
pub use rules::{
    AxeTier, ChopQuality, Theme, UpgradeEffect, is_streak_milestone, judge_timing,
    multiplier_for, next_drop_time, promotion_target, theme_for,
};
pub use state::{GameSession, LiveLog, LogEvent, LogId, LogState, SessionId, TransitionError};
