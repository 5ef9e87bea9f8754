//! Retry with exponential backoff

use crate::error::{CompkitError, CompkitResult};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retry policy
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Total attempts, including the first one
    pub retries: u32,

    /// Wait before the second attempt
    pub initial_delay: Duration,

    /// Multiplier applied to the wait after each failure
    pub backoff_factor: f64,
}

impl RetryOptions {
    /// Wait after the failed attempt with zero-based index `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// `retries` attempts are used up; the last error is returned.
///
/// `on_retry` observes each failure that will be retried, with the 1-based
/// number of the attempt that failed.
pub async fn retry<T, F, Fut, O>(
    mut operation: F,
    options: &RetryOptions,
    mut on_retry: O,
) -> CompkitResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CompkitResult<T>>,
    O: FnMut(&CompkitError, u32),
{
    let attempts = options.retries.max(1);
    let mut attempt = 0;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        attempt += 1;

        if attempt >= attempts || !error.is_retryable() {
            return Err(error);
        }

        on_retry(&error, attempt);
        let delay = options.delay_for(attempt - 1);
        debug!("Attempt {}/{} failed, retrying in {:?}", attempt, attempts, delay);
        tokio::time::sleep(delay).await;
    }
}
