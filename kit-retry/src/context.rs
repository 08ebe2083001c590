//! Cancellation contexts consulted between attempts.
//!
//! The retry loop only needs to know whether the caller is still interested
//! in the result and, if not, why. [`Cancellation`] captures exactly that; the
//! bundled [`Context`] implements it on top of a [`CancellationToken`] and an
//! optional deadline.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ContextError {
    /// The context was cancelled explicitly.
    #[error("context canceled")]
    Canceled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// A source of cancellation for a retry run.
#[async_trait]
pub trait Cancellation: Send + Sync {
    /// The reason the context is done, or `None` while it is still live.
    fn err(&self) -> Option<ContextError>;

    /// Check if the context is done.
    fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolve once the context is done.
    async fn done(&self);
}

#[async_trait]
impl Cancellation for CancellationToken {
    fn err(&self) -> Option<ContextError> {
        self.is_cancelled().then_some(ContextError::Canceled)
    }

    async fn done(&self) {
        self.cancelled().await;
    }
}

/// A cancellable context with an optional deadline.
///
/// Clones share the same cancellation state.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Context {
    /// A context that is never done unless cancelled.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Alias of [`Context::background`], reads better at call sites that cancel.
    pub fn with_cancel() -> Self {
        Self::background()
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Wrap an existing token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a child context.
    ///
    /// The child is cancelled when the parent is, but cancelling the child
    /// leaves the parent untouched. `timeout` can only shorten the parent's
    /// deadline.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[async_trait]
impl Cancellation for Context {
    fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}
