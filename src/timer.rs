// ⏱️ Autoplay Timer - scoped, cancellable, one at a time
//
// A `TimerGuard` owns one armed timer. Dropping the guard cancels the timer,
// so an owner that goes away (normally or by unwinding) can never be called
// back afterwards.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Identifies one arming of a timer. A fire carrying an older token is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken(pub u64);

/// Where timers come from (event loop, test clock, ...)
pub trait TimerSource {
    /// Arm a one-shot timer that reports `token` once `interval` has elapsed
    fn arm(&mut self, token: TickToken, interval: Duration) -> TimerGuard;
}

// ============================================================================
// TIMER GUARD
// ============================================================================

/// RAII handle for an armed timer
pub struct TimerGuard {
    token: TickToken,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerGuard {
    pub fn new(token: TickToken, cancel: impl FnOnce() + 'static) -> Self {
        TimerGuard {
            token,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn token(&self) -> TickToken {
        self.token
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TimerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerGuard").field("token", &self.token).finish()
    }
}

// ============================================================================
// DEADLINE CLOCK
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: TickToken,
    deadline: Instant,
}

/// Single-threaded timer source for poll-based event loops.
///
/// Holds at most one pending deadline. The loop uses `next_deadline()` as its
/// poll timeout and `take_due(now)` to collect the fire.
#[derive(Debug, Clone, Default)]
pub struct DeadlineClock {
    pending: Rc<RefCell<Option<Pending>>>,
}

impl DeadlineClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.borrow().map(|p| p.deadline)
    }

    /// Time left before the pending deadline (zero if already due)
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Pop the pending token if its deadline has passed
    pub fn take_due(&self, now: Instant) -> Option<TickToken> {
        let due = self.pending.borrow().filter(|p| p.deadline <= now);
        if due.is_some() {
            *self.pending.borrow_mut() = None;
        }
        due.map(|p| p.token)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl TimerSource for DeadlineClock {
    fn arm(&mut self, token: TickToken, interval: Duration) -> TimerGuard {
        *self.pending.borrow_mut() = Some(Pending {
            token,
            deadline: Instant::now() + interval,
        });

        let pending = Rc::downgrade(&self.pending);
        TimerGuard::new(token, move || {
            if let Some(pending) = pending.upgrade() {
                let mut slot = pending.borrow_mut();
                // a newer arming owns the slot now
                if slot.map_or(false, |p| p.token == token) {
                    *slot = None;
                }
            }
        })
    }
}
