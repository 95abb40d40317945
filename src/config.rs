use std::time::Duration;

use crate::{
    error::*,
    retry::{Backoff, RetryPolicy},
};

const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Settings for resolving seed endpoints, read once when a resolver is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionConfig {
    /// Wait after the first unsuccessful attempt. Also the unit used to size the attempt budget.
    pub retry_interval: Duration,
    /// Overall budget. The number of attempts is `resolution_timeout / retry_interval`.
    pub resolution_timeout: Duration,
    /// Growth factor for successive waits. 1.0 keeps the interval fixed.
    pub backoff_multiplier: f64,
    /// Upper bound on a single wait when `backoff_multiplier` is above 1.
    pub max_backoff: Duration,
    pub jitter: f64,
    /// Accept a lookup that succeeds with no addresses instead of retrying it.
    pub accept_empty: bool,
    /// Also enforce `resolution_timeout` as a wall-clock deadline, not just as an attempt count.
    pub enforce_timeout: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            resolution_timeout: DEFAULT_RESOLUTION_TIMEOUT,
            backoff_multiplier: 1.0,
            max_backoff: DEFAULT_MAX_BACKOFF,
            jitter: 0.0,
            accept_empty: false,
            enforce_timeout: false,
        }
    }
}

impl ResolutionConfig {
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn with_resolution_timeout(mut self, timeout: Duration) -> Self {
        self.resolution_timeout = timeout;
        self
    }

    pub fn with_exponential_backoff(mut self, multiplier: f64, max_backoff: Duration) -> Self {
        self.backoff_multiplier = multiplier;
        self.max_backoff = max_backoff;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_accept_empty(mut self, accept_empty: bool) -> Self {
        self.accept_empty = accept_empty;
        self
    }

    pub fn with_enforced_timeout(mut self, enforce: bool) -> Self {
        self.enforce_timeout = enforce;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.resolution_timeout < self.retry_interval {
            return Err(ConfigError::TimeoutBelowInterval {
                timeout: self.resolution_timeout,
                interval: self.retry_interval,
            });
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::InvalidJitter(self.jitter));
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidMultiplier(self.backoff_multiplier));
        }
        Ok(())
    }

    /// Validate the settings and turn them into a [`RetryPolicy`].
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        self.validate()?;

        let attempts = self.resolution_timeout.as_nanos() / self.retry_interval.as_nanos();
        let max_attempts = u32::try_from(attempts).unwrap_or(u32::MAX).max(1);

        let backoff = if self.backoff_multiplier > 1.0 {
            Backoff::Exponential {
                initial: self.retry_interval,
                max: self.max_backoff.max(self.retry_interval),
                multiplier: self.backoff_multiplier,
            }
        } else {
            Backoff::Fixed(self.retry_interval)
        };

        Ok(RetryPolicy {
            max_attempts,
            backoff,
            jitter: self.jitter,
            accept_empty: self.accept_empty,
            deadline: self.enforce_timeout.then_some(self.resolution_timeout),
        })
    }
}
