//! Retry controller with exponential backoff.
//!
//! One canonical policy wraps every service call, chunk-level and
//! fallback-item alike: bounded attempts, doubling delay with a cap,
//! and a raised floor when the failure looks like rate limiting.

use crate::config::PipelineConfig;
use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Always >= 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Minimum delay before retrying a rate-limited failure.
    pub rate_limit_floor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            rate_limit_floor: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: config.base_delay,
            max_delay: config.max_delay,
            rate_limit_floor: config.rate_limit_floor,
        }
    }

    /// Delay before the (attempt+1)-th try; `attempt` is 0-based, so
    /// the first failure waits `base_delay`.
    pub fn backoff_delay(&self, attempt: u32, rate_limited: bool) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let mut delay = base.saturating_mul(factor).min(self.max_delay.as_millis() as u64);
        if rate_limited {
            delay = delay.max(self.rate_limit_floor.as_millis() as u64);
        }
        Duration::from_millis(delay)
    }

    /// Drive `op` through the attempt loop.
    ///
    /// Non-retryable errors (validation, configuration) fail
    /// immediately; the last error propagates unmodified in kind once
    /// attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !e.is_retryable() || attempt + 1 >= self.max_attempts {
                        if attempt > 0 {
                            warn!(attempts = attempt + 1, error = %e, "retries exhausted");
                        }
                        return Err(e);
                    }
                    let delay = self.backoff_delay(attempt, e.is_rate_limited());
                    debug!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        rate_limited = e.is_rate_limited(),
                        error = %e,
                        "attempt failed, backing off"
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
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::default()
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_max_minus_one_failures() {
        let calls = AtomicU32::new(0);
        let result = policy()
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(Error::transient("flaky"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fails_after_exactly_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::transient("always down")) }
            })
            .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Transient {
                rate_limited: false,
                ..
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn non_retryable_errors_fail_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = tokio_test::block_on(policy().run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::validation("bad record")) }
        }));
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn error_kind_survives_exhaustion() {
        let result: Result<()> = policy()
            .run(|| async { Err(Error::malformed("still garbage")) })
            .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::MalformedResponse { .. }
        ));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy();
        assert_eq!(p.backoff_delay(0, false), Duration::from_millis(500));
        assert_eq!(p.backoff_delay(1, false), Duration::from_millis(1000));
        assert_eq!(p.backoff_delay(2, false), Duration::from_millis(2000));
        // Way past the cap.
        assert_eq!(p.backoff_delay(10, false), Duration::from_secs(8));
    }

    #[test]
    fn rate_limit_floor_raises_early_delays() {
        let p = policy();
        assert_eq!(p.backoff_delay(0, true), Duration::from_secs(2));
        assert_eq!(p.backoff_delay(1, true), Duration::from_secs(2));
        // Once the curve clears the floor, the curve wins.
        assert_eq!(p.backoff_delay(3, true), Duration::from_secs(4));
    }
}
