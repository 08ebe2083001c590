//! # kit-retry
//!
//! Bounded or unbounded retries with exponential, jittered backoff.
//!
//! ## Core Concepts
//!
//! - **[`BackoffConfig`]**: How long to wait before each retry
//! - **[`RetryPolicy`]**: Attempt budget, backoff and which errors to retry
//! - **[`Cancellation`]**: Caller-driven cancellation checked between attempts
//! - **[`retry`]** / **[`retry_forever`]**: Zero-configuration entry points
//!
//! ## Backoff
//!
//! The delay before retry `n` is `base_delay * multiplier^n`, capped at
//! `max_delay`, then scaled by a random factor in `[1 - jitter, 1 + jitter]`
//! so that callers failing together do not retry in lockstep. Index 0 is
//! returned as `base_delay` without jitter.
//!
//! ## Example
//!
//! ```ignore
//! use kit_retry::{Context, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy: RetryPolicy<std::io::Error> = RetryPolicy::new(5)
//!     .base_delay(Duration::from_millis(50))
//!     .retryable(|e| e.kind() != std::io::ErrorKind::PermissionDenied);
//!
//! let ctx = Context::with_timeout(Duration::from_secs(30));
//! let data = policy.run(ctx, |_ctx| async { read_remote().await }).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod context;
pub mod error;
pub mod executor;
pub mod jitter;
pub mod policy;

// Re-exports
pub use backoff::{BackoffConfig, BackoffConfigBuilder};
pub use context::{Cancellation, Context, ContextError};
pub use error::{ConfigError, RetryError, RetryResult};
pub use executor::{retry, retry_forever, AttemptInfo, RetryState};
pub use jitter::{FixedJitter, JitterSource, SeededJitter, ThreadRngJitter};
pub use policy::{RetryPolicy, Retryable, DEFAULT_ATTEMPTS};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        retry, retry_forever, BackoffConfig, Cancellation, Context, RetryError, RetryPolicy,
        RetryResult,
    };
}
