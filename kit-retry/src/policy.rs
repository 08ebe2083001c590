//! Retry policy: attempt budget, backoff and retryability.

use crate::backoff::BackoffConfig;
use crate::jitter::{JitterSource, ThreadRngJitter};
use std::sync::Arc;
use std::time::Duration;

/// Attempt budget used by [`RetryPolicy::default_policy`].
pub const DEFAULT_ATTEMPTS: i32 = 2;

/// Predicate deciding whether an error is worth another attempt.
pub type Retryable<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// How a single call site retries.
///
/// A policy is read-only once built and can drive any number of concurrent
/// runs. Cloning is cheap.
pub struct RetryPolicy<E = anyhow::Error> {
    /// Maximum number of attempts, the first call included. Zero or less
    /// means no limit.
    pub attempts: i32,
    /// Backoff between attempts.
    pub backoff: BackoffConfig,
    retryable: Retryable<E>,
    jitter_source: Arc<dyn JitterSource>,
    interruptible_wait: bool,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            attempts: self.attempts,
            backoff: self.backoff,
            retryable: Arc::clone(&self.retryable),
            jitter_source: Arc::clone(&self.jitter_source),
            interruptible_wait: self.interruptible_wait,
        }
    }
}

impl<E> std::fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("attempts", &self.attempts)
            .field("backoff", &self.backoff)
            .field("interruptible_wait", &self.interruptible_wait)
            .finish_non_exhaustive()
    }
}

impl<E: 'static> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self::default_policy()
    }
}

impl<E: 'static> RetryPolicy<E> {
    /// Create a policy with the given attempt budget and default backoff.
    /// Every error is considered retryable.
    pub fn new(attempts: i32) -> Self {
        Self {
            attempts,
            backoff: BackoffConfig::default(),
            retryable: Arc::new(|_: &E| true),
            jitter_source: Arc::new(ThreadRngJitter),
            interruptible_wait: false,
        }
    }

    /// Two attempts with the default backoff.
    pub fn default_policy() -> Self {
        Self::new(DEFAULT_ATTEMPTS)
    }

    /// Retry until success, a non-retryable error, or cancellation.
    pub fn infinite() -> Self {
        Self::new(-1)
    }

    /// Set the retryability predicate.
    pub fn retryable(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.retryable = Arc::new(predicate);
        self
    }

    /// Replace the whole backoff configuration.
    pub fn backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Override the base delay. Ignored unless positive.
    pub fn base_delay(mut self, d: Duration) -> Self {
        if !d.is_zero() {
            self.backoff.base_delay = d;
        }
        self
    }

    /// Override the max delay. Ignored unless positive.
    pub fn max_delay(mut self, d: Duration) -> Self {
        if !d.is_zero() {
            self.backoff.max_delay = d;
        }
        self
    }

    /// Override the multiplier. Ignored unless positive.
    pub fn multiplier(mut self, m: f64) -> Self {
        if m > 0.0 {
            self.backoff.multiplier = m;
        }
        self
    }

    /// Override the jitter fraction. Ignored if negative.
    pub fn jitter(mut self, j: f64) -> Self {
        if j >= 0.0 {
            self.backoff.jitter = j;
        }
        self
    }

    /// Use a different random source for jitter.
    pub fn jitter_source(mut self, source: impl JitterSource + 'static) -> Self {
        self.jitter_source = Arc::new(source);
        self
    }

    /// Let cancellation cut the wait between attempts short.
    ///
    /// Off by default: the wait always runs to completion and cancellation
    /// is only observed before the next attempt.
    pub fn interruptible_wait(mut self, enabled: bool) -> Self {
        self.interruptible_wait = enabled;
        self
    }

    /// Check if the attempt budget is unlimited.
    pub fn is_unbounded(&self) -> bool {
        self.attempts <= 0
    }

    /// Check if `error` should be retried.
    pub fn is_retryable(&self, error: &E) -> bool {
        (self.retryable)(error)
    }

    /// Check if `attempts` made so far use up the budget.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.attempts > 0 && i64::from(attempts) >= i64::from(self.attempts)
    }

    /// Delay before retry number `retry_index`.
    pub fn delay(&self, retry_index: u32) -> Duration {
        self.backoff.compute_delay(retry_index, self.jitter_source.as_ref())
    }

    pub(crate) fn waits_interruptibly(&self) -> bool {
        self.interruptible_wait
    }
}
