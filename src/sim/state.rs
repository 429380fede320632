//! Session state and the log lifecycle
//!
//! Everything a single play-through owns lives in [`GameSession`]. A restart
//! replaces the whole value; only the high score is carried over.

use thiserror::Error;

use super::rules::{AxeTier, Theme};
use crate::consts::*;
use crate::scheduler::TimerHandle;

/// Identity of one falling log. Never reused, not even across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogId(pub u64);

/// Identity of one play-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u32);

/// Where the current log is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogState {
    /// No log yet, or the last one was cleared away
    #[default]
    Waiting,
    /// Falling; a tap now is too early
    Dropping,
    /// Last 20% of the fall; a tap now is graded
    Choppable,
    /// Landed and decaying; a tap now is still graded
    OnBlock,
    Chopped,
    Missed,
}

/// Things that can happen to the current log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    Drop,
    ChoppableTimer,
    Landed,
    Tap,
    DecayTimer,
    /// Log removed without resolution (game over, restart)
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("log event {event:?} is not valid in state {from:?}")]
pub struct TransitionError {
    pub from: LogState,
    pub event: LogEvent,
}

impl LogState {
    /// Next state for `event`, or an error for pairs that have no transition
    pub fn apply(self, event: LogEvent) -> Result<LogState, TransitionError> {
        use LogEvent as E;
        use LogState as S;
        match (self, event) {
            (S::Waiting | S::Chopped | S::Missed, E::Drop) => Ok(S::Dropping),
            (S::Dropping, E::ChoppableTimer) => Ok(S::Choppable),
            (S::Dropping | S::Choppable, E::Landed) => Ok(S::OnBlock),
            (S::Dropping, E::Tap) => Ok(S::Missed),
            (S::Choppable | S::OnBlock, E::Tap) => Ok(S::Chopped),
            (S::OnBlock, E::DecayTimer) => Ok(S::Missed),
            (_, E::Discard) => Ok(S::Waiting),
            (from, event) => Err(TransitionError { from, event }),
        }
    }

    /// Whether a log in this state is still waiting to be resolved
    pub fn is_live(&self) -> bool {
        matches!(self, LogState::Dropping | LogState::Choppable | LogState::OnBlock)
    }
}

/// Pending timers that belong to the live log
#[derive(Debug, Clone, Default)]
pub struct LogTimers {
    pub choppable: Option<TimerHandle>,
    pub landed: Option<TimerHandle>,
    pub decay: Option<TimerHandle>,
}

impl LogTimers {
    /// Take every handle, leaving the set empty
    pub fn drain(&mut self) -> Vec<TimerHandle> {
        [self.choppable.take(), self.landed.take(), self.decay.take()]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// The one log currently in play
#[derive(Debug, Clone)]
pub struct LiveLog {
    pub id: LogId,
    /// When the drop began (ms)
    pub drop_start: f64,
    /// Fall duration this log was dropped with (ms)
    pub drop_time: f64,
    /// When the log is scheduled to hit the block (ms)
    pub landing_time: f64,
    pub timers: LogTimers,
}

/// Complete state of one play-through
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: SessionId,
    pub score: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub multiplier: u32,
    pub lives: u8,
    pub high_score: u64,
    /// Fall duration for the next log (ms)
    pub current_drop_time: f64,
    pub axe_tier: AxeTier,
    pub theme: Theme,
    pub log_state: LogState,
    pub log: Option<LiveLog>,
    /// Set by any resolving tap, cleared when the next log starts falling
    pub input_locked: bool,
    /// Handle of the scheduled next drop, if any
    pub next_drop: Option<TimerHandle>,
    pub game_over: bool,
    pub is_restarting: bool,
}

impl GameSession {
    /// Fresh session; `high_score` is the only value carried in
    pub fn new(id: SessionId, high_score: u64) -> Self {
        Self {
            id,
            score: 0,
            streak: 0,
            best_streak: 0,
            multiplier: 1,
            lives: MAX_LIVES,
            high_score,
            current_drop_time: BASE_DROP_TIME_MS,
            axe_tier: AxeTier::Standard,
            theme: Theme::Day,
            log_state: LogState::Waiting,
            log: None,
            input_locked: false,
            next_drop: None,
            game_over: false,
            is_restarting: false,
        }
    }

    /// Id of the live log, if one is in play
    pub fn live_log_id(&self) -> Option<LogId> {
        self.log.as_ref().map(|log| log.id)
    }
}
