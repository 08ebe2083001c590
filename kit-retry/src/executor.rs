//! Retry executor for running operations with retries.

use crate::context::{Cancellation, ContextError};
use crate::error::{RetryError, RetryResult};
use crate::policy::RetryPolicy;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// State of a retry run.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    /// Number of attempts made (1-indexed).
    pub attempt: u32,
    /// Last error message.
    pub last_error: Option<String>,
    /// Total time spent waiting.
    pub total_wait_time: Duration,
    /// History of attempts.
    pub history: Vec<AttemptInfo>,
}

/// Information about a single attempt.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Attempt number.
    pub attempt: u32,
    /// Whether it succeeded.
    pub success: bool,
    /// Error message if failed.
    pub error: Option<String>,
    /// Wait scheduled after this attempt.
    pub wait_time: Duration,
}

impl<E> RetryPolicy<E>
where
    E: Debug + 'static,
{
    /// Run `operation` until it succeeds or the policy gives up.
    ///
    /// The context is checked before every attempt and handed to the
    /// operation. The run ends with:
    /// - `Ok` on the first success,
    /// - [`RetryError::Operation`] holding the error unchanged when it is not
    ///   retryable or the attempt budget is spent,
    /// - [`RetryError::Cancelled`] when the context is done before an attempt.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use kit_retry::{Context, RetryPolicy};
    ///
    /// let policy: RetryPolicy = RetryPolicy::new(3);
    /// let body = policy
    ///     .run(Context::background(), |_ctx| async { fetch().await })
    ///     .await?;
    /// ```
    pub async fn run<C, F, Fut, T>(&self, ctx: C, operation: F) -> RetryResult<T, E>
    where
        C: Cancellation + Clone,
        F: FnMut(C) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive(ctx, operation, |_, _, _| {}).await
    }

    /// Like [`RetryPolicy::run`], also returning what happened along the way.
    ///
    /// Every attempt adds an entry to [`RetryState::history`]. With an
    /// unbounded policy the history grows for as long as the run lasts.
    pub async fn run_with_state<C, F, Fut, T>(
        &self,
        ctx: C,
        operation: F,
    ) -> (RetryResult<T, E>, RetryState)
    where
        C: Cancellation + Clone,
        F: FnMut(C) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut state = RetryState::default();
        let result = self
            .drive(ctx, operation, |attempt, error: Option<&E>, wait| {
                state.attempt = attempt;
                state.total_wait_time += wait;
                let message = error.map(ToString::to_string);
                if message.is_some() {
                    state.last_error = message.clone();
                }
                state.history.push(AttemptInfo {
                    attempt,
                    success: error.is_none(),
                    error: message,
                    wait_time: wait,
                });
            })
            .await;
        (result, state)
    }

    async fn drive<C, F, Fut, T, R>(
        &self,
        ctx: C,
        mut operation: F,
        mut record: R,
    ) -> RetryResult<T, E>
    where
        C: Cancellation + Clone,
        F: FnMut(C) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: FnMut(u32, Option<&E>, Duration),
    {
        let mut retries: u32 = 0;

        loop {
            if let Some(cause) = ctx.err() {
                debug!(retries, cause = %cause, "Context done before attempt");
                return Err(RetryError::Cancelled(cause));
            }

            let attempt = retries.saturating_add(1);
            debug!(attempt, max_attempts = self.attempts, "Executing retry attempt");

            let error = match operation(ctx.clone()).await {
                Ok(value) => {
                    record(attempt, None, Duration::ZERO);
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !self.is_retryable(&error) {
                record(attempt, Some(&error), Duration::ZERO);
                warn!(attempt, error = ?error, "Error not retryable");
                return Err(RetryError::Operation(error));
            }

            retries = attempt;
            if self.is_exhausted(retries) {
                record(attempt, Some(&error), Duration::ZERO);
                warn!(attempt, error = ?error, "Retry attempts exhausted");
                return Err(RetryError::Operation(error));
            }

            let wait = self.delay(retries);
            record(attempt, Some(&error), wait);
            debug!(
                attempt,
                wait_ms = wait.as_millis() as u64,
                error = ?error,
                "Waiting before retry"
            );

            if self.waits_interruptibly() {
                tokio::select! {
                    _ = sleep(wait) => {}
                    _ = ctx.done() => {
                        let cause = ctx.err().unwrap_or(ContextError::Canceled);
                        debug!(attempt, cause = %cause, "Context done during backoff");
                        return Err(RetryError::Cancelled(cause));
                    }
                }
            } else {
                sleep(wait).await;
            }
        }
    }
}

/// Run `operation` with [`RetryPolicy::default_policy`].
pub async fn retry<C, F, Fut, T, E>(ctx: C, operation: F) -> RetryResult<T, E>
where
    C: Cancellation + Clone,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Debug + 'static,
{
    RetryPolicy::<E>::default_policy().run(ctx, operation).await
}

/// Run `operation` with [`RetryPolicy::infinite`].
pub async fn retry_forever<C, F, Fut, T, E>(ctx: C, operation: F) -> RetryResult<T, E>
where
    C: Cancellation + Clone,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Debug + 'static,
{
    RetryPolicy::<E>::infinite().run(ctx, operation).await
}
