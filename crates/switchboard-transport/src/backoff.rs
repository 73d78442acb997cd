//! Exponential backoff for poll retries.

use std::time::Duration;

/// Tracks the delay before the next retry.
///
/// Each failure multiplies the delay, capped at `max_delay`. A success
/// resets it to `initial_delay`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    current: Duration,
    failures: u32,
}

impl Backoff {
    /// Creates a backoff starting at `initial_delay`.
    pub fn new(initial_delay: Duration, max_delay: Duration, multiplier: f64) -> Self {
        Self {
            initial_delay,
            max_delay: max_delay.max(initial_delay),
            multiplier: multiplier.max(1.0),
            current: initial_delay,
            failures: 0,
        }
    }

    /// Records a failure and returns how long to wait before retrying.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.failures = self.failures.saturating_add(1);
        self.current = self.current.mul_f64(self.multiplier).min(self.max_delay);
        delay
    }

    /// Records a success.
    pub fn reset(&mut self) {
        self.current = self.initial_delay;
        self.failures = 0;
    }

    /// Consecutive failures since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60), 2.0)
    }
}
