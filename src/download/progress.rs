//! Time-based throttling of progress notifications.

use std::time::Duration;

use tokio::time::Instant;

use super::constants::PROGRESS_INTERVAL;

/// Decides which transport progress notifications reach the caller.
///
/// One throttle lives for exactly one download call. The first notification is
/// always forwarded; after that a notification is forwarded only when at least
/// `interval` has elapsed since the last forwarded one. Dropped notifications are
/// never replayed, so forwarded values keep transport order.
///
/// Time comes from [`tokio::time::Instant`], so a paused Tokio clock drives it.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    interval: Duration,
    last_emitted: Option<Instant>,
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(PROGRESS_INTERVAL)
    }
}

impl ProgressThrottle {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emitted: None,
        }
    }

    /// Returns whether a notification arriving at `now` should be forwarded,
    /// recording `now` as the last emission when it should.
    pub fn should_emit_at(&mut self, now: Instant) -> bool {
        let due = self
            .last_emitted
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.last_emitted = Some(now);
        }
        due
    }

    /// [`should_emit_at`](Self::should_emit_at) using the current time.
    pub fn should_emit(&mut self) -> bool {
        self.should_emit_at(Instant::now())
    }
}

/// A caller's progress callback behind a [`ProgressThrottle`].
pub struct ThrottledProgress<F> {
    throttle: ProgressThrottle,
    callback: F,
}

impl<F: FnMut(u8)> ThrottledProgress<F> {
    pub fn new(interval: Duration, callback: F) -> Self {
        Self {
            throttle: ProgressThrottle::new(interval),
            callback,
        }
    }

    /// Forwards a transport notification if the throttle allows it.
    pub fn report(&mut self, percent: u8) {
        if self.throttle.should_emit() {
            (self.callback)(percent.min(100));
        }
    }

    /// Tells the caller the transfer restarted from scratch.
    ///
    /// Bypasses the throttle and leaves its window untouched.
    pub fn restart(&mut self) {
        (self.callback)(0);
    }
}
