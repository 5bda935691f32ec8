use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use freight_core::RateLimiter;
use freight_logging::freight_info;
use tokio::time::Instant;

/// Rate limiter shared by every upstream call of a batch job.
#[derive(Debug)]
pub struct Throttle {
    limiter: Mutex<RateLimiter>,
}

impl Throttle {
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self {
            limiter: Mutex::new(RateLimiter::new(max_calls, window, now())),
        }
    }

    pub fn reset(&self) {
        self.lock().reset(now());
    }

    /// Waits, if needed, until the next upstream call fits in the budget.
    pub async fn acquire(&self) {
        let wait = self.lock().reserve(now());
        if !wait.is_zero() {
            freight_info!("rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    pub fn calls_in_window(&self) -> u32 {
        self.lock().calls_in_window()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RateLimiter> {
        self.limiter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(freight_core::DEFAULT_MAX_CALLS, freight_core::DEFAULT_WINDOW)
    }
}

// tokio's clock so paused-time tests drive the limiter too.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}
