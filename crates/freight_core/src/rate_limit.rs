use std::time::{Duration, Instant};

pub const DEFAULT_MAX_CALLS: u32 = 15;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Call-count throttle over a fixed window.
///
/// Pure arithmetic over caller-supplied instants; the caller performs the wait.
/// Once `max_calls` have been reserved, the next reservation waits until the
/// window has fully elapsed and then opens a new window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiter {
    max_calls: u32,
    window: Duration,
    calls: u32,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(max_calls: u32, window: Duration, now: Instant) -> Self {
        Self {
            max_calls: max_calls.max(1),
            window,
            calls: 0,
            window_start: now,
        }
    }

    pub fn with_defaults(now: Instant) -> Self {
        Self::new(DEFAULT_MAX_CALLS, DEFAULT_WINDOW, now)
    }

    pub fn reset(&mut self, now: Instant) {
        self.calls = 0;
        self.window_start = now;
    }

    /// Reserves one call and returns how long the caller must wait before issuing it.
    pub fn reserve(&mut self, now: Instant) -> Duration {
        let mut wait = Duration::ZERO;
        if self.calls >= self.max_calls {
            let elapsed = now.saturating_duration_since(self.window_start);
            wait = self.window.saturating_sub(elapsed);
            self.calls = 0;
            self.window_start = now + wait;
        }
        self.calls += 1;
        wait
    }

    pub fn calls_in_window(&self) -> u32 {
        self.calls
    }

    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    pub fn max_calls(&self) -> u32 {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
