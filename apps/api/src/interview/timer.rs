//! Per-question countdown.
//!
//! The controller holds no wall-clock state: it counts logical seconds and is
//! advanced by `tick()`, which the session ticker calls once per second while
//! the session mutex is held. Tests drive it synchronously.

use chrono::{DateTime, Utc};
use tracing::debug;

/// Answer text recorded when a question's countdown reaches zero.
pub const TIMEOUT_ANSWER_TEXT: &str = "Time ran out - no answer provided";

/// Source of timestamps for answers and results.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Emitted at most once per arm cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerSignal {
    AutoSubmit { answer_text: &'static str },
}

#[derive(Debug, Clone, Default)]
pub struct TimerController {
    budget: u32,
    remaining: u32,
    armed: bool,
}

impl TimerController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh countdown, discarding whatever was left of the previous one.
    pub fn arm(&mut self, budget_seconds: u32) {
        self.budget = budget_seconds;
        self.remaining = budget_seconds;
        self.armed = true;
        debug!("Timer armed with {budget_seconds}s");
    }

    /// Continues a countdown restored from a snapshot.
    pub fn resume(&mut self, budget_seconds: u32, remaining_seconds: u32) {
        self.budget = budget_seconds;
        self.remaining = remaining_seconds.min(budget_seconds);
        self.armed = true;
        debug!("Timer resumed at {}s of {budget_seconds}s", self.remaining);
    }

    /// Advances one logical second. Ticks while disarmed are ignored.
    pub fn tick(&mut self) -> Option<TimerSignal> {
        if !self.armed {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.armed = false;
            return Some(TimerSignal::AutoSubmit {
                answer_text: TIMEOUT_ANSWER_TEXT,
            });
        }
        None
    }

    /// Disarms without emitting. Remaining seconds are kept for time-spent accounting.
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Seconds consumed in the current (or last) arm cycle.
    pub fn elapsed(&self) -> u32 {
        self.budget.saturating_sub(self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_signal_after_budget_ticks() {
        let mut timer = TimerController::new();
        timer.arm(20);

        let signals: Vec<_> = (0..20).filter_map(|_| timer.tick()).collect();
        assert_eq!(signals.len(), 1);
        assert_eq!(
            signals[0],
            TimerSignal::AutoSubmit {
                answer_text: TIMEOUT_ANSWER_TEXT
            }
        );
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_ticks_past_budget_are_silent() {
        let mut timer = TimerController::new();
        timer.arm(3);
        let total = (0..10).filter_map(|_| timer.tick()).count();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_remaining_strictly_decreases_while_armed() {
        let mut timer = TimerController::new();
        timer.arm(5);
        let mut previous = timer.remaining();
        for _ in 0..4 {
            timer.tick();
            assert_eq!(timer.remaining(), previous - 1);
            previous = timer.remaining();
        }
    }

    #[test]
    fn test_cancel_suppresses_signal() {
        let mut timer = TimerController::new();
        timer.arm(2);
        timer.tick();
        timer.cancel();
        assert!(timer.tick().is_none());
        assert_eq!(timer.remaining(), 1);
        assert_eq!(timer.elapsed(), 1);
    }

    #[test]
    fn test_rearm_resets_to_new_budget() {
        let mut timer = TimerController::new();
        timer.arm(60);
        for _ in 0..30 {
            timer.tick();
        }
        timer.arm(120);
        assert_eq!(timer.remaining(), 120);
        assert_eq!(timer.elapsed(), 0);
    }

    #[test]
    fn test_resume_clamps_to_budget() {
        let mut timer = TimerController::new();
        timer.resume(20, 45);
        assert_eq!(timer.remaining(), 20);
        assert!(timer.is_armed());
    }

    #[test]
    fn test_unarmed_timer_never_signals() {
        let mut timer = TimerController::new();
        assert!(timer.tick().is_none());
        assert_eq!(timer.remaining(), 0);
    }
}
