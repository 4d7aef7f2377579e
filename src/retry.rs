//! Bounded retry policy and the clock it waits on

use std::time::Duration;

/// Blocking wait between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// `retries` extra attempts after the first one, `delay` between each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Runs `attempt` until it yields `Some`, sleeping between attempts.
    /// The closure receives the 0-based attempt number.
    pub fn run<T>(
        &self,
        sleeper: &dyn Sleeper,
        mut attempt: impl FnMut(u32) -> Option<T>,
    ) -> Option<T> {
        for n in 0..self.attempts() {
            if n > 0 {
                sleeper.sleep(self.delay);
            }
            if let Some(value) = attempt(n) {
                return Some(value);
            }
        }
        None
    }
}
