//! Exponential backoff with jitter.

use crate::error::ConfigError;
use crate::jitter::{JitterSource, ThreadRngJitter};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff parameters.
///
/// The value is immutable once built; share it freely between concurrent runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Ceiling on the delay before jitter is applied.
    pub max_delay: Duration,
    /// Growth factor per retry.
    pub multiplier: f64,
    /// Fraction by which the delay may randomly deviate either way.
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(15),
            multiplier: 1.6,
            jitter: 0.2,
        }
    }
}

impl BackoffConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> BackoffConfigBuilder {
        BackoffConfigBuilder::default()
    }

    /// Delay before retry number `retry_index`, using the thread-local generator.
    pub fn duration(&self, retry_index: u32) -> Duration {
        self.compute_delay(retry_index, &ThreadRngJitter)
    }

    /// Delay before retry number `retry_index`.
    ///
    /// Index 0 returns `base_delay` as is, without jitter. For later indices
    /// the base delay is multiplied once per index until it reaches
    /// `max_delay`, capped there, then scaled by `1 + jitter * u` with `u`
    /// drawn from `source`. Negative results become zero.
    pub fn compute_delay(&self, retry_index: u32, source: &dyn JitterSource) -> Duration {
        if retry_index == 0 {
            return self.base_delay;
        }

        let max = self.max_delay.as_nanos() as f64;
        let mut backoff = self.base_delay.as_nanos() as f64;
        let mut remaining = retry_index;
        while backoff < max && remaining > 0 {
            let next = backoff * self.multiplier;
            // Fixed point (zero base or unit multiplier): further steps change nothing.
            if next == backoff {
                break;
            }
            backoff = next;
            remaining -= 1;
        }
        if backoff > max {
            backoff = max;
        }

        backoff *= 1.0 + self.jitter * source.sample();
        if backoff < 0.0 {
            return Duration::ZERO;
        }
        from_nanos_f64(backoff)
    }

    /// Check the settings strictly instead of ignoring bad values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_delay.is_zero() {
            return Err(ConfigError::ZeroBaseDelay);
        }
        if self.max_delay.is_zero() {
            return Err(ConfigError::ZeroMaxDelay);
        }
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(ConfigError::InvalidMultiplier(self.multiplier));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::InvalidJitter(self.jitter));
        }
        Ok(())
    }
}

// Saturates at u64::MAX nanoseconds; NaN maps to zero.
fn from_nanos_f64(nanos: f64) -> Duration {
    Duration::from_nanos(nanos.max(0.0) as u64)
}

/// Builder for [`BackoffConfig`].
///
/// Overrides that make no sense are dropped and the default is kept:
/// delays and multiplier must be positive, jitter must not be negative.
#[derive(Debug, Default)]
pub struct BackoffConfigBuilder {
    base_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<f64>,
}

impl BackoffConfigBuilder {
    /// Set base delay.
    #[must_use]
    pub fn base_delay(mut self, d: Duration) -> Self {
        if !d.is_zero() {
            self.base_delay = Some(d);
        }
        self
    }

    /// Set max delay.
    #[must_use]
    pub fn max_delay(mut self, d: Duration) -> Self {
        if !d.is_zero() {
            self.max_delay = Some(d);
        }
        self
    }

    /// Set multiplier.
    #[must_use]
    pub fn multiplier(mut self, m: f64) -> Self {
        if m > 0.0 {
            self.multiplier = Some(m);
        }
        self
    }

    /// Set jitter factor.
    #[must_use]
    pub fn jitter(mut self, j: f64) -> Self {
        if j >= 0.0 {
            self.jitter = Some(j);
        }
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> BackoffConfig {
        let mut config = BackoffConfig::default();
        if let Some(v) = self.base_delay {
            config.base_delay = v;
        }
        if let Some(v) = self.max_delay {
            config.max_delay = v;
        }
        if let Some(v) = self.multiplier {
            config.multiplier = v;
        }
        if let Some(v) = self.jitter {
            config.jitter = v;
        }
        config
    }
}
