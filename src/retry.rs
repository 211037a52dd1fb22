//! Bounded retry with exponential backoff
//!
//! Every remote call in the pipeline (LLM completion, web search) goes
//! through [`with_retry`] so that short network blips and transient rate
//! limits do not fail a request outright.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// Retry policy for a single remote call
///
/// The delay doubles after every failed attempt (1s, 2s, 4s, ... starting
/// from `initial_delay`). There is no jitter and no cap on growth.
///
/// # Examples
///
/// ```
/// use jarvis::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 3);
/// assert_eq!(policy.initial_delay, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// A `max_attempts` of zero is treated as a single attempt.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// Policy that calls exactly once and never sleeps
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Run `call` until it succeeds or the attempt budget is spent
///
/// Failures are not classified: every error is retried the same way. After
/// the final attempt the last error is returned as-is so callers can still
/// downcast it.
///
/// # Arguments
///
/// * `policy` - Attempt budget and initial delay
/// * `label` - Short name of the call, used in log lines
/// * `call` - Zero-argument factory producing the future to run
///
/// # Errors
///
/// Returns the error of the last attempt when all attempts fail
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => return Err(err),
            Err(err) => {
                tracing::warn!(
                    "Attempt {}/{} failed ({}). Retrying in {:.1}s: {}",
                    attempt,
                    max_attempts,
                    label,
                    delay.as_secs_f64(),
                    err
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}
