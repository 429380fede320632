//! Chop timing engine
//!
//! Owns the [`GameSession`] and reacts to two kinds of input: taps and fired
//! timers. Every reaction is a synchronous state step that appends
//! [`Intent`]s for the presentation layer.
//!
//! Each timer tied to a log carries that log's [`LogId`]. When a log is
//! resolved or discarded its timers are cancelled, and any that still reach
//! [`ChopEngine::on_timer`] are dropped because their id no longer matches
//! the live log.

use super::intent::{Intent, MissCause};
use super::rules::{
    AxeTier, ChopQuality, is_streak_milestone, judge_timing, multiplier_for, next_drop_time,
    promotion_target, theme_for,
};
use super::state::{GameSession, LiveLog, LogEvent, LogId, LogState, LogTimers, SessionId};
use crate::consts::*;
use crate::highscores::HighScoreStore;
use crate::scheduler::{Scheduler, Timer, VirtualScheduler};
use crate::settings::Settings;

/// Dev tooling commands, only honored with `Settings::dev_hotkeys`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevCommand {
    /// Force the axe up to a tier (never down)
    PromoteAxe(AxeTier),
    ResetAxeTier,
    /// Jump the streak to preview a sky theme
    ForceStreakTheme(u32),
}

/// Dev flags, resolved once from [`Settings`]
#[derive(Debug, Clone, Copy, Default)]
struct DevFlags {
    god_mode: bool,
    hotkeys: bool,
}

/// The game core
pub struct ChopEngine<S: Scheduler, P: HighScoreStore> {
    scheduler: S,
    store: P,
    dev: DevFlags,
    session: GameSession,
    next_log_id: u64,
    next_session_id: u32,
    intents: Vec<Intent>,
}

impl<S: Scheduler, P: HighScoreStore> ChopEngine<S, P> {
    /// Build an engine with a fresh session. Loads the high score from `store`.
    pub fn new(scheduler: S, mut store: P, settings: &Settings) -> Self {
        let high_score = store.load_high_score();
        if settings.god_mode {
            log::warn!("God mode enabled");
        }
        Self {
            scheduler,
            store,
            dev: DevFlags {
                god_mode: settings.god_mode,
                hotkeys: settings.dev_hotkeys,
            },
            session: GameSession::new(SessionId(1), high_score),
            next_log_id: 1,
            next_session_id: 2,
            intents: Vec::new(),
        }
    }

    /// Announce the session and schedule its first log
    pub fn start(&mut self) {
        log::info!(
            "Session {} started (high score {})",
            self.session.id.0,
            self.session.high_score
        );
        self.intents.push(Intent::SessionStarted {
            high_score: self.session.high_score,
        });
        self.schedule_next_drop(FIRST_DROP_DELAY_MS);
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Intents emitted since the last drain, in order
    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn drain_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    /// Start a new log falling.
    ///
    /// No-op once the game is over, while a restart is in flight or while a
    /// log is still in play. Replaces any queued drop.
    pub fn drop_log(&mut self) {
        if self.session.game_over || self.session.is_restarting {
            return;
        }
        // Only one log may ever be in play
        if self.session.log.is_some() || self.session.log_state.is_live() {
            log::debug!("Drop ignored: log already in play");
            return;
        }
        if !self.apply_log_event(LogEvent::Drop) {
            return;
        }
        if let Some(handle) = self.session.next_drop.take() {
            self.scheduler.cancel(handle);
        }

        let id = LogId(self.next_log_id);
        self.next_log_id += 1;

        let now = self.scheduler.now();
        let drop_time = self.session.current_drop_time;
        let timers = LogTimers {
            choppable: Some(
                self.scheduler
                    .after(drop_time * CHOPPABLE_FRACTION, Timer::Choppable(id)),
            ),
            landed: Some(self.scheduler.after(drop_time, Timer::Landed(id))),
            decay: None,
        };

        self.session.input_locked = false;
        self.session.log = Some(LiveLog {
            id,
            drop_start: now,
            drop_time,
            landing_time: now + drop_time,
            timers,
        });
        log::debug!("Log {} dropping ({:.0} ms)", id.0, drop_time);
        self.intents.push(Intent::log_dropped(id, drop_time));
    }

    /// Handle one discrete tap (pointer down, key press)
    pub fn tap(&mut self) {
        if self.session.is_restarting {
            log::debug!("Tap ignored: restart in progress");
            return;
        }
        if self.session.game_over {
            self.restart_game();
            return;
        }

        self.intents.push(Intent::AxeSwung);

        if self.session.input_locked {
            return;
        }
        let Some(landing_time) = self.session.log.as_ref().map(|log| log.landing_time) else {
            return;
        };

        match self.session.log_state {
            LogState::Dropping => {
                if self.apply_log_event(LogEvent::Tap) {
                    self.miss(MissCause::Early);
                }
            }
            LogState::Choppable | LogState::OnBlock => {
                let quality = if self.dev.god_mode {
                    ChopQuality::Perfect
                } else {
                    let offset = self.scheduler.now() - landing_time;
                    judge_timing(offset, self.session.axe_tier)
                };
                if self.apply_log_event(LogEvent::Tap) {
                    self.chop(quality);
                }
            }
            _ => {}
        }
    }

    /// Handle a fired timer. Stale timers are ignored.
    pub fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::Choppable(id) => {
                let Some(log) = self.live_log_mut(id) else {
                    log::debug!("Stale choppable timer for log {}", id.0);
                    return;
                };
                log.timers.choppable = None;
                if self.apply_log_event(LogEvent::ChoppableTimer) {
                    self.intents.push(Intent::LogChoppable { log_id: id.0 });
                    if self.dev.god_mode && !self.session.input_locked {
                        self.intents.push(Intent::AxeSwung);
                        if self.apply_log_event(LogEvent::Tap) {
                            self.chop(ChopQuality::Perfect);
                        }
                    }
                }
            }
            Timer::Landed(id) => {
                let Some(log) = self.live_log_mut(id) else {
                    log::debug!("Stale landing timer for log {}", id.0);
                    return;
                };
                log.timers.landed = None;
                if self.apply_log_event(LogEvent::Landed) {
                    self.intents.push(Intent::LogLanded { log_id: id.0 });
                    let decay = self.scheduler.after(DECAY_MS, Timer::Decay(id));
                    if let Some(log) = self.session.log.as_mut() {
                        log.timers.decay = Some(decay);
                    }
                }
            }
            Timer::Decay(id) => {
                let Some(log) = self.live_log_mut(id) else {
                    log::debug!("Stale decay timer for log {}", id.0);
                    return;
                };
                log.timers.decay = None;
                if self.apply_log_event(LogEvent::DecayTimer) {
                    self.miss(MissCause::Timeout);
                }
            }
            Timer::NextDrop(session_id) => {
                if session_id != self.session.id {
                    log::debug!("Stale drop timer for session {}", session_id.0);
                    return;
                }
                self.session.next_drop = None;
                self.drop_log();
            }
            Timer::Restart => {
                if !self.session.is_restarting {
                    log::debug!("Stale restart timer");
                    return;
                }
                self.finish_restart();
            }
        }
    }

    /// Drop the axe back to the base tier, unconditionally
    pub fn reset_axe_tier(&mut self) {
        self.session.axe_tier = AxeTier::Standard;
        self.intents.push(Intent::AxeTierReset);
    }

    /// Promote the axe if the current streak unlocks a higher tier.
    ///
    /// Idempotent: a second call at the same streak does nothing.
    pub fn check_axe_promotion(&mut self) -> Option<AxeTier> {
        let target = promotion_target(self.session.streak, self.session.axe_tier)?;
        self.promote_axe(target).then_some(target)
    }

    /// Run a dev command. Returns `false` if dev hotkeys are disabled.
    pub fn dev_command(&mut self, command: DevCommand) -> bool {
        if !self.dev.hotkeys {
            log::debug!("Dev command {:?} ignored (hotkeys disabled)", command);
            return false;
        }
        match command {
            DevCommand::PromoteAxe(tier) => {
                self.promote_axe(tier);
            }
            DevCommand::ResetAxeTier => self.reset_axe_tier(),
            DevCommand::ForceStreakTheme(streak) => {
                self.session.streak = streak;
                self.session.best_streak = self.session.best_streak.max(streak);
                self.intents.push(Intent::StreakChanged { value: streak });
                self.update_multiplier();
                self.update_theme(false);
            }
        }
        true
    }

    /// Graded hit; the log has already moved to `Chopped`
    fn chop(&mut self, quality: ChopQuality) {
        self.cancel_log_timers();
        self.session.input_locked = true;

        // Points use the multiplier of the streak this chop reaches
        let s = &mut self.session;
        s.streak += 1;
        s.best_streak = s.best_streak.max(s.streak);
        let points = quality.base_points() * u64::from(multiplier_for(s.streak));
        s.score += points;
        s.log = None;

        self.intents.push(Intent::ChopResolved { quality, points });
        self.intents.push(Intent::feedback(quality.feedback()));
        self.intents.push(Intent::LogSplit);
        self.intents.push(Intent::ScoreChanged {
            value: self.session.score,
        });
        self.intents.push(Intent::StreakChanged {
            value: self.session.streak,
        });
        self.update_multiplier();
        self.update_theme(false);
        if is_streak_milestone(self.session.streak) {
            self.intents.push(Intent::StreakMilestone {
                streak: self.session.streak,
            });
        }

        self.session.current_drop_time = next_drop_time(self.session.current_drop_time);

        // God mode chops would promote on every log; keep the axe as is
        if !(self.dev.god_mode && quality == ChopQuality::Perfect) {
            self.check_axe_promotion();
        }

        self.schedule_next_drop(CHOP_COOLDOWN_MS);
    }

    /// Lost log; it has already moved to `Missed`
    fn miss(&mut self, cause: MissCause) {
        self.cancel_log_timers();
        self.session.input_locked = true;
        self.session.log = None;

        self.intents.push(Intent::MissOccurred { cause });
        self.intents.push(Intent::feedback(cause.feedback()));

        self.break_streak();
        self.lose_life();

        if !self.session.game_over {
            self.schedule_next_drop(MISS_COOLDOWN_MS);
        }
    }

    fn break_streak(&mut self) {
        self.session.streak = 0;
        self.session.current_drop_time = BASE_DROP_TIME_MS;
        self.intents.push(Intent::StreakChanged { value: 0 });
        self.update_multiplier();
        self.update_theme(true);
    }

    fn lose_life(&mut self) {
        if self.session.lives == 0 {
            return;
        }
        self.session.lives -= 1;
        self.intents.push(Intent::LivesChanged {
            value: self.session.lives,
        });
        if self.session.lives == 0 {
            self.trigger_game_over();
        }
    }

    fn trigger_game_over(&mut self) {
        if self.session.game_over {
            return;
        }
        self.session.game_over = true;

        if let Some(handle) = self.session.next_drop.take() {
            self.scheduler.cancel(handle);
        }
        if self.session.log.is_some() {
            self.discard_log();
        }

        let s = &mut self.session;
        let is_new_high_score = s.score > s.high_score;
        if is_new_high_score {
            s.high_score = s.score;
            self.store.save_high_score(s.high_score);
        }

        log::info!(
            "Game over: score {}, best streak {}{}",
            s.score,
            s.best_streak,
            if is_new_high_score { " (new high score)" } else { "" }
        );
        self.intents.push(Intent::GameOver {
            final_score: s.score,
            is_new_high_score,
            best_streak: s.best_streak,
            high_score: s.high_score,
        });
    }

    fn restart_game(&mut self) {
        if self.session.is_restarting {
            return;
        }
        self.session.is_restarting = true;
        self.scheduler.cancel_all();
        self.session.next_drop = None;
        if let Some(log) = self.session.log.as_mut() {
            log.timers = LogTimers::default();
        }
        self.intents.push(Intent::Restarting);
        self.scheduler.after(RESTART_DELAY_MS, Timer::Restart);
    }

    fn finish_restart(&mut self) {
        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        self.session = GameSession::new(id, self.session.high_score);
        self.start();
    }

    fn promote_axe(&mut self, tier: AxeTier) -> bool {
        if tier <= self.session.axe_tier {
            return false;
        }
        let Some(effect) = tier.upgrade_effect() else {
            return false;
        };
        self.session.axe_tier = tier;
        log::info!("Axe promoted to {:?} at streak {}", tier, self.session.streak);
        self.intents.push(Intent::AxeTierPromoted { tier, effect });
        self.intents
            .push(Intent::feedback((effect.feedback_text, effect.feedback_color)));
        true
    }

    fn update_multiplier(&mut self) {
        let multiplier = multiplier_for(self.session.streak);
        if multiplier != self.session.multiplier {
            self.session.multiplier = multiplier;
            self.intents.push(Intent::MultiplierChanged { value: multiplier });
        }
    }

    /// Recompute the sky theme; `force` emits even when unchanged
    fn update_theme(&mut self, force: bool) {
        let theme = theme_for(self.session.streak);
        if force || theme != self.session.theme {
            self.session.theme = theme;
            self.intents.push(Intent::ThemeChanged { theme });
        }
    }

    fn schedule_next_drop(&mut self, delay_ms: f64) {
        if self.session.game_over {
            return;
        }
        if let Some(handle) = self.session.next_drop.take() {
            self.scheduler.cancel(handle);
        }
        let handle = self
            .scheduler
            .after(delay_ms, Timer::NextDrop(self.session.id));
        self.session.next_drop = Some(handle);
    }

    fn apply_log_event(&mut self, event: LogEvent) -> bool {
        match self.session.log_state.apply(event) {
            Ok(next) => {
                self.session.log_state = next;
                true
            }
            Err(e) => {
                log::debug!("{}", e);
                false
            }
        }
    }

    /// The live log, only if `id` is still the one in play
    fn live_log_mut(&mut self, id: LogId) -> Option<&mut LiveLog> {
        self.session.log.as_mut().filter(|log| log.id == id)
    }

    fn cancel_log_timers(&mut self) {
        if let Some(log) = self.session.log.as_mut() {
            for handle in log.timers.drain() {
                self.scheduler.cancel(handle);
            }
        }
    }

    /// Remove the live log without resolving it
    fn discard_log(&mut self) {
        self.cancel_log_timers();
        self.session.log = None;
        self.apply_log_event(LogEvent::Discard);
    }
}

impl<P: HighScoreStore> ChopEngine<VirtualScheduler, P> {
    /// Advance the virtual clock by `ms`, firing due timers in order
    pub fn advance(&mut self, ms: f64) {
        let target = self.scheduler.now() + ms;
        self.advance_to(target);
    }

    /// Advance the virtual clock to `target`, firing due timers in order
    pub fn advance_to(&mut self, target: f64) {
        while let Some(timer) = self.scheduler.pop_due(target) {
            self.on_timer(timer);
        }
        self.scheduler.set_now(target);
    }
}
