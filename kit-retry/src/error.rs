//! Retry error types.

use crate::context::ContextError;
use thiserror::Error;

/// Error returned by a retry run.
///
/// The operation's own error is surfaced verbatim in [`RetryError::Operation`],
/// whether the run stopped because the error was not retryable or because the
/// attempt budget ran out. The two cases are intentionally indistinguishable.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The context was done before the next attempt could start.
    #[error(transparent)]
    Cancelled(ContextError),

    /// The last error returned by the operation.
    #[error("{0}")]
    Operation(E),
}

impl<E> RetryError<E> {
    /// Check if the run ended because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Get the cancellation cause, if any.
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            Self::Cancelled(err) => Some(*err),
            Self::Operation(_) => None,
        }
    }

    /// Borrow the operation error, if any.
    pub fn operation(&self) -> Option<&E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Cancelled(_) => None,
        }
    }

    /// Take the operation error, if any.
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Cancelled(_) => None,
        }
    }
}

impl<E> From<ContextError> for RetryError<E> {
    fn from(err: ContextError) -> Self {
        Self::Cancelled(err)
    }
}

/// Invalid backoff settings, reported by strict validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Base delay must be positive.
    #[error("base delay must be greater than zero")]
    ZeroBaseDelay,

    /// Max delay must be positive.
    #[error("max delay must be greater than zero")]
    ZeroMaxDelay,

    /// Multiplier must be a positive finite number.
    #[error("multiplier must be a positive finite number, got {0}")]
    InvalidMultiplier(f64),

    /// Jitter must lie within `[0, 1]`.
    #[error("jitter must be between 0 and 1, got {0}")]
    InvalidJitter(f64),
}

/// Result type for retry runs.
pub type RetryResult<T, E = anyhow::Error> = Result<T, RetryError<E>>;
