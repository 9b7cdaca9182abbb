//! Bounded retry with exponential backoff for remote operations.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{FetchError, FetchResult};

/// Retry schedule for remote operations.
///
/// The delay after the n-th failed attempt (zero-based) is
/// `initial_delay * backoff_multiplier^n`. The schedule applies no cap and
/// no jitter, so under sustained failure the delay grows without bound;
/// callers bound worst-case latency by cancelling through a deadline-bound
/// token, which the executor honors mid-delay.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first call. Values below 1 are
    /// treated as 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Growth factor applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and default backoff.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Single attempt, no delays.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    /// Effective attempt budget, clamped to at least one.
    pub const fn attempt_budget(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Delay applied after the failed attempt with the given zero-based
    /// index.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.initial_delay
            .mul_f64(self.backoff_multiplier.powi(attempt as i32))
    }
}

/// Run `operation` under `policy`, honoring `cancel` between and during
/// attempts.
///
/// Each attempt receives a child token that is cancelled when `cancel` is,
/// so in-flight work can observe the withdrawal directly. A cancelled token
/// yields [`FetchError::cancelled`] without starting another attempt;
/// cancellation during an inter-attempt delay aborts the schedule the same
/// way and is never reported as exhaustion. Non-retryable failures
/// short-circuit the schedule unchanged. Once the budget is spent the
/// outcome is [`FetchError::exhausted`] carrying the attempt count and the
/// last failure; no delay follows the final attempt.
pub async fn execute_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> FetchResult<T>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let budget = policy.attempt_budget();
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::cancelled());
        }

        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::cancelled()),
            outcome = operation(cancel.child_token()) => outcome,
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(error) => {
                attempt += 1;
                warn!(attempt, budget, error = %error, "remote call attempt failed");
                if !error.retryable() {
                    return Err(error);
                }
                if attempt >= budget {
                    return Err(FetchError::exhausted(budget, &error));
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::cancelled()),
            _ = tokio::time::sleep(delay) => {}
        }
        delay = delay.mul_f64(policy.backoff_multiplier);
    }
}
