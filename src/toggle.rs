//! Verify-and-retry helper for boolean social toggles.
//!
//! Love and favorite endpoints acknowledge with the flag's new value, but the
//! acknowledgment sometimes echoes the state from before the request. The
//! action is re-issued until the acknowledgment matches, within the bounds of
//! a [`RetryPolicy`].

use std::future::Future;
use std::time::Duration;

use crate::error::{Result, ScratchError};

/// Bounds for re-issuing a toggle whose acknowledgment is stale.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Growth factor applied per attempt.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Create a policy with exponential backoff between `initial` and `max`.
    #[must_use]
    pub const fn new(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff: initial,
            max_backoff: max,
            multiplier: 2.0,
        }
    }

    /// Retry without waiting between attempts.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    /// Set the multiplier.
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay to wait after the given (0-indexed) failed attempt.
    ///
    /// Never exceeds `max_backoff`. A negative or undefined delay (negative
    /// multiplier, zero times infinity) is zero.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        if delay.is_nan() || delay <= 0.0 {
            return Duration::ZERO;
        }
        if delay >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        Duration::try_from_secs_f64(delay).unwrap_or(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(100), Duration::from_secs(2))
    }
}

/// Run `action` until it acknowledges `desired`.
///
/// `action` performs the remote mutation and returns the flag value echoed
/// by the server. Errors from `action` are returned immediately; only a
/// mismatched acknowledgment triggers another attempt.
///
/// # Errors
///
/// Returns the first error produced by `action`, or
/// [`ScratchError::RetryExhausted`] when `policy.max_attempts` attempts all
/// returned the wrong value.
pub async fn set_flag<F, Fut>(
    policy: &RetryPolicy,
    name: &'static str,
    desired: bool,
    mut action: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let attempts = policy.max_attempts.max(1);

    for attempt in 0..attempts {
        let acknowledged = action().await?;
        if acknowledged == desired {
            tracing::debug!(action = name, attempt = attempt + 1, "toggle acknowledged");
            return Ok(());
        }

        tracing::warn!(
            action = name,
            attempt = attempt + 1,
            acknowledged,
            desired,
            "stale toggle acknowledgment"
        );

        if attempt + 1 < attempts {
            let delay = policy.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(ScratchError::RetryExhausted {
        action: name,
        attempts,
    })
}
