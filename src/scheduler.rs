//! One-shot timers
//!
//! The engine never sleeps. It asks a [`Scheduler`] to deliver a [`Timer`]
//! after a delay and the host hands fired timers back to the engine. Timers
//! are plain data so a stale one can be recognized and dropped on arrival.

use slotmap::{SlotMap, new_key_type};

use crate::sim::{LogId, SessionId};

new_key_type! {
    /// Identifies a pending timer.
    ///
    /// Generational: a handle whose timer already fired or was cancelled never
    /// aliases a newer timer, so cancelling it again is harmless.
    pub struct TimerHandle;
}

/// Work the engine scheduled for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// 80% of the fall has elapsed for this log
    Choppable(LogId),
    /// Fall animation finished; the log sits on the block
    Landed(LogId),
    /// The landed log was left unchopped for too long
    Decay(LogId),
    /// Drop the next log of this session
    NextDrop(SessionId),
    /// Replace the finished session with a fresh one
    Restart,
}

/// Clock plus one-shot timer service
///
/// Implementations deliver timers one at a time on the engine's thread and
/// never while another engine call is in progress.
pub trait Scheduler {
    /// Monotonic time in milliseconds
    fn now(&self) -> f64;

    /// Schedule `timer` to fire `delay_ms` from now
    fn after(&mut self, delay_ms: f64, timer: Timer) -> TimerHandle;

    /// Cancel a pending timer. Returns `false` if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Cancel everything still pending
    fn cancel_all(&mut self);
}

#[derive(Debug, Clone)]
struct Pending {
    due: f64,
    /// Scheduling order, breaks ties between equal due times
    seq: u64,
    timer: Timer,
}

/// Deterministic scheduler driven by explicit clock advances.
///
/// Used for headless play and tests. Timers fire in (due time, scheduling
/// order) order and the clock jumps to each timer's due time as it fires.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: f64,
    next_seq: u64,
    pending: SlotMap<TimerHandle, Pending>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers still waiting to fire
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<f64> {
        self.earliest().map(|(_, p)| p.due)
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, until: f64) -> Option<Timer> {
        let (handle, due) = self
            .earliest()
            .filter(|(_, p)| p.due <= until)
            .map(|(h, p)| (h, p.due))?;
        let pending = self.pending.remove(handle)?;
        self.now = self.now.max(due);
        Some(pending.timer)
    }

    /// Move the clock forward without firing anything.
    ///
    /// The clock never runs backwards; earlier targets are ignored.
    pub fn set_now(&mut self, now: f64) {
        if now > self.now {
            self.now = now;
        }
    }

    fn earliest(&self) -> Option<(TimerHandle, &Pending)> {
        self.pending.iter().min_by(|(_, a), (_, b)| {
            a.due
                .total_cmp(&b.due)
                .then_with(|| a.seq.cmp(&b.seq))
        })
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> f64 {
        self.now
    }

    fn after(&mut self, delay_ms: f64, timer: Timer) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(Pending {
            due: self.now + delay_ms.max(0.0),
            seq,
            timer,
        })
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(handle).is_some()
    }

    fn cancel_all(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut sched = VirtualScheduler::new();
        sched.after(1000.0, Timer::Restart);
        sched.after(800.0, Timer::NextDrop(SessionId(1)));

        assert_eq!(sched.pop_due(500.0), None);
        assert_eq!(sched.pop_due(2000.0), Some(Timer::NextDrop(SessionId(1))));
        assert_eq!(sched.now(), 800.0);
        assert_eq!(sched.pop_due(2000.0), Some(Timer::Restart));
        assert_eq!(sched.now(), 1000.0);
        assert_eq!(sched.pop_due(2000.0), None);
    }

    #[test]
    fn test_equal_due_times_keep_scheduling_order() {
        let mut sched = VirtualScheduler::new();
        sched.after(100.0, Timer::Restart);
        sched.after(100.0, Timer::NextDrop(SessionId(7)));

        assert_eq!(sched.pop_due(100.0), Some(Timer::Restart));
        assert_eq!(sched.pop_due(100.0), Some(Timer::NextDrop(SessionId(7))));
    }

    #[test]
    fn test_cancelled_handle_is_inert() {
        let mut sched = VirtualScheduler::new();
        let handle = sched.after(50.0, Timer::Restart);
        assert!(sched.cancel(handle));
        assert!(!sched.cancel(handle));

        // A new timer never reuses the old handle's identity
        let fresh = sched.after(50.0, Timer::Restart);
        assert_ne!(fresh, handle);
        assert!(!sched.cancel(handle));
        assert_eq!(sched.pending_count(), 1);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut sched = VirtualScheduler::new();
        sched.set_now(500.0);
        sched.set_now(100.0);
        assert_eq!(sched.now(), 500.0);

        sched.after(10.0, Timer::Restart);
        assert_eq!(sched.next_due(), Some(510.0));
    }
}
