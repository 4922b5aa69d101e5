//! Bounded retry with exponential backoff
//!
//! Generic wrapper for the I/O steps of the pipeline. Failures are expected
//! to arrive already classified; non-retryable ones fail immediately so no
//! retry budget is spent on operations that cannot succeed. The backoff
//! sleep is a tokio sleep and never blocks unrelated concurrent uploads.

use std::future::Future;
use std::time::Duration;

use tavola_core::{ClassifiedError, ErrorKind};

/// Retry configuration. The defaults give attempts at roughly
/// t = 0, 1s, 2s, 4s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before the retry following 0-based attempt `attempt`:
    /// `min(base_delay * multiplier^attempt, max_delay)`. The cap is applied
    /// in seconds so large attempt numbers saturate instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}

/// Run `operation` with bounded retries and exponential backoff.
///
/// The operation runs up to `max_retries + 1` times. A non-retryable error
/// propagates immediately; after the budget is exhausted the last error is
/// propagated.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, ClassifiedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClassifiedError>>,
{
    let mut last_error = None;

    for attempt in 0..=policy.max_retries {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !e.retryable {
                    tracing::warn!(
                        operation = operation_name,
                        kind = %e.kind,
                        "Operation failed with non-retryable error"
                    );
                    return Err(e);
                }
                if attempt < policy.max_retries {
                    let delay = policy.delay_for(attempt);
                    tracing::warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_retries = policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Operation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        ClassifiedError::new(
            ErrorKind::Unknown,
            "The operation failed after all retries.",
            false,
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            backoff_multiplier: 2.0,
        }
    }

    fn retryable() -> ClassifiedError {
        ClassifiedError::new(ErrorKind::Storage, "transient", true)
    }

    #[test]
    fn delays_are_non_decreasing_and_capped() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..6).map(|a| policy.delay_for(a)).collect();
        assert_eq!(delays[0], Duration::from_secs(1));
        assert_eq!(delays[1], Duration::from_secs(2));
        assert_eq!(delays[2], Duration::from_secs(4));
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(delays[5], Duration::from_secs(10));
    }

    #[test]
    fn large_attempt_numbers_saturate_at_max_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(64), Duration::from_secs(10));
        assert_eq!(policy.delay_for(1000), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn always_failing_operation_runs_max_retries_plus_one_times() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(retryable()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_retryable_error_causes_exactly_one_attempt() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ClassifiedError::validation("bad input")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_when_a_later_attempt_succeeds() {
        let attempts = AtomicU32::new(0);
        let result = with_retry(&fast_policy(), "test", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(retryable())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_a_single_attempt() {
        let attempts = AtomicU32::new(0);
        let policy = fast_policy().with_max_retries(0);
        let result: Result<(), _> = with_retry(&policy, "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(retryable()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
