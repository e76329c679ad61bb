//! Retry with exponential backoff.

use crate::config::RetrySettings;
use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Delay multiplier applied after each failure.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            backoff_factor: settings.backoff_factor.max(1.0),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 1..attempt {
            if delay >= self.max_delay {
                break;
            }
            delay = Duration::try_from_secs_f64(delay.as_secs_f64() * self.backoff_factor)
                .unwrap_or(self.max_delay);
        }
        delay.min(self.max_delay)
    }

    /// Execute an async operation, retrying retryable failures.
    ///
    /// Non-retryable errors and the error from the final attempt are
    /// returned as-is.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying after error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnakkError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(150),
            backoff_factor: 2.0,
        }
    }

    #[test]
    fn test_delay_growth_is_capped() {
        let policy = policy(5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(150));
        assert_eq!(policy.delay_for(10), Duration::from_millis(150));
    }

    #[test]
    fn test_huge_backoff_factor_saturates_at_max_delay() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
            backoff_factor: 1e30,
        };
        assert_eq!(policy.delay_for(2), Duration::from_secs(60));

        let policy = RetryPolicy {
            backoff_factor: f64::INFINITY,
            ..policy
        };
        assert_eq!(policy.delay_for(3), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures_below_ceiling() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = policy(3)
            .execute(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(SnakkError::Search("unavailable".to_string()))
                } else {
                    Ok("ok")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms, then 200ms capped to 150ms
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(250));
        assert!(elapsed < Duration::from_millis(260));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_at_ceiling() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = policy(3)
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SnakkError::Search("down".to_string()))
            })
            .await;

        assert!(matches!(result, Err(SnakkError::Search(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = policy(5)
            .execute(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SnakkError::InvalidInput("bad query".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
