//! Configuration for catalog loading and resolution polling.
//!
//! Defaults match the game's tuning: ten attempts half a second apart,
//! after a short settle delay that gives the owning page time to publish its
//! catalog.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{RemedyError, RemedyResult};

/// Default logical name of the remedy data source.
pub const DEFAULT_SOURCE_NAME: &str = "remedies";

/// Bounded polling policy for the retry accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of resolution attempts.
    pub max_attempts: u32,
    /// Suspension between attempts.
    pub delay: Duration,
    /// Suspension before the first attempt.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_millis(500),
            initial_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Policy with no settle delay.
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            initial_delay: Duration::ZERO,
        }
    }

    /// Sets the attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the delay before the first attempt.
    #[must_use]
    pub const fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Longest time a resolution can spend suspended under this policy.
    #[must_use]
    pub fn worst_case_wait(&self) -> Duration {
        self.initial_delay + self.delay * self.max_attempts.saturating_sub(1)
    }

    /// Checks the policy is usable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `max_attempts` is zero.
    pub fn validate(&self) -> RemedyResult<()> {
        if self.max_attempts == 0 {
            return Err(RemedyError::config("max_attempts must be at least 1"));
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemedyConfig {
    /// Logical name passed to the remedy source.
    pub source_name: String,
    /// Polling policy for resolution.
    pub retry: RetryPolicy,
}

impl Default for RemedyConfig {
    fn default() -> Self {
        Self {
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    source_name: Option<String>,
    #[serde(default)]
    retry: RawRetry,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRetry {
    max_attempts: Option<u32>,
    delay_ms: Option<u64>,
    initial_delay_ms: Option<u64>,
}

impl RemedyConfig {
    /// Parse configuration from JSON. Missing fields take their defaults.
    ///
    /// ```
    /// use remedy_core::RemedyConfig;
    ///
    /// let config = RemedyConfig::from_json_str(r#"{ "retry": { "max_attempts": 3 } }"#).unwrap();
    /// assert_eq!(config.source_name, "remedies");
    /// assert_eq!(config.retry.max_attempts, 3);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid JSON, unknown fields, an
    /// empty source name, or an invalid retry policy.
    pub fn from_json_str(text: &str) -> RemedyResult<Self> {
        let raw: RawConfig = serde_json::from_str(text)
            .map_err(|e| RemedyError::config(format!("invalid config: {e}")))?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: raw.retry.max_attempts.unwrap_or(defaults.max_attempts),
            delay: raw
                .retry
                .delay_ms
                .map_or(defaults.delay, Duration::from_millis),
            initial_delay: raw
                .retry
                .initial_delay_ms
                .map_or(defaults.initial_delay, Duration::from_millis),
        };
        retry.validate()?;

        let source_name = raw.source_name.unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string());
        if source_name.trim().is_empty() {
            return Err(RemedyError::config("source_name cannot be empty"));
        }

        Ok(Self { source_name, retry })
    }
}
