//! Exponential-backoff policy for the frame socket.
//!
//! The first retry waits [`BackoffConfig::initial_delay`]; every
//! scheduled attempt doubles the delay up to
//! [`BackoffConfig::max_delay`]. A successful open resets it.

use std::time::Duration;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each attempt.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`BackoffConfig::max_delay`].
pub fn next_delay(current: Duration, config: &BackoffConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Backoff state for one receiver.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    current: Duration,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        let current = config.initial_delay;
        Self { config, current }
    }

    /// Delay for the attempt being scheduled now; grows the delay for
    /// the attempt after it.
    pub fn next_attempt(&mut self) -> Duration {
        let delay = self.current.min(self.config.max_delay);
        self.current = next_delay(self.current, &self.config);
        delay
    }

    /// Back to the initial delay after a successful open.
    pub fn reset(&mut self) {
        self.current = self.config.initial_delay;
    }

    pub fn current(&self) -> Duration {
        self.current
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}
