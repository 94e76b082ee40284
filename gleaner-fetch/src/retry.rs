//! Retry policy for HTTP requests.

use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default base delay between retries.
pub const DEFAULT_SLEEP_TIME: Duration = Duration::from_secs(1);

/// Upper bound for any single wait.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// How the wait grows between retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backoff {
    /// Always wait `sleep_time`.
    Fixed,
    /// Wait `sleep_time * 2^(attempt - 1)`.
    #[default]
    Exponential,
}

/// Policy for retrying transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base delay between retries.
    pub sleep_time: Duration,
    /// Growth of the delay.
    pub backoff: Backoff,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given retry budget and default timing.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            sleep_time: DEFAULT_SLEEP_TIME,
            backoff: Backoff::default(),
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            sleep_time: Duration::ZERO,
            backoff: Backoff::Fixed,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    pub fn with_sleep_time(mut self, sleep_time: Duration) -> Self {
        self.sleep_time = sleep_time;
        self
    }

    /// Sets the backoff growth.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the delay cap.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Whether another attempt may follow `attempts` attempts already made.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }

    /// Calculates the delay after the given attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            Backoff::Fixed => self.sleep_time,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.sleep_time.saturating_mul(factor)
            }
        };

        delay.min(self.max_delay)
    }

    /// Like [`Self::delay_for_attempt`], but a server `Retry-After` hint wins.
    pub fn delay_with_hint(&self, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
        retry_after_secs
            .map_or_else(|| self.delay_for_attempt(attempt), Duration::from_secs)
            .min(self.max_delay)
    }

    /// Determines if a transport error should be retried.
    pub fn should_retry(&self, error: &reqwest::Error) -> bool {
        error.is_connect() || error.is_timeout()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}
