//! Exponential backoff with jitter for a single fallible remote step.
//!
//! # Design
//! - Delay before retry `n` is `min(base * 2^(n-1) + jitter, cap)`.
//! - Permanent failures are surfaced on the first occurrence; only transient
//!   ones (see [`RemoteError::is_retryable`]) consume further attempts.
//! - The policy never loops past `max_attempts`.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use scanvault_config::RetrySettings;
use scanvault_config::defaults::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_JITTER_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS,
};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::RemoteError;

/// Final failure of a retried step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{last} (after {attempts} attempt(s))")]
pub struct RetryFailure {
    /// Attempts made, including the failing one.
    pub attempts: u32,
    /// Failure returned by the last attempt.
    pub last: RemoteError,
}

/// Retry schedule shared by the download and upload steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            Duration::from_millis(DEFAULT_JITTER_MS),
        )
    }
}

impl From<&RetrySettings> for BackoffPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            settings.base_delay,
            settings.max_delay,
            settings.jitter,
        )
    }
}

impl BackoffPolicy {
    /// Build a policy; `max_attempts` is clamped to at least one.
    #[must_use]
    pub const fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        jitter: Duration,
    ) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            base_delay,
            max_delay,
            jitter,
        }
    }

    /// Policy that retries without sleeping.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Attempts allowed per step.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after failed attempt `attempt` (1-based) with the given jitter sample.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, jitter: Duration) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1_u32 << exponent)
            .saturating_add(jitter)
            .min(self.max_delay)
    }

    fn sample_jitter(&self) -> Duration {
        if self.jitter.is_zero() {
            return Duration::ZERO;
        }
        let upper = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(0..=upper))
    }

    /// Run `call` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `call` receives the 1-based attempt number. `operation` and `subject` only
    /// label log lines.
    ///
    /// # Errors
    ///
    /// Returns [`RetryFailure`] carrying the last failure and the attempt count.
    pub async fn retry<T, F, Fut>(
        &self,
        operation: &'static str,
        subject: &str,
        mut call: F,
    ) -> Result<T, RetryFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempt = 1;
        loop {
            match call(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, subject, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(last) if !last.is_retryable() || attempt >= self.max_attempts => {
                    return Err(RetryFailure {
                        attempts: attempt,
                        last,
                    });
                }
                Err(err) => {
                    let delay = self.delay_for(attempt, self.sample_jitter());
                    warn!(
                        operation,
                        subject,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient failure; backing off"
                    );
                    sleep(delay).await;
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

    fn transient() -> RemoteError {
        RemoteError::Transport {
            operation: "download",
            detail: "connection reset".to_string(),
        }
    }

    #[test]
    fn delays_double_and_respect_cap() {
        let policy = BackoffPolicy::new(
            5,
            Duration::from_secs(2),
            Duration::from_secs(10),
            Duration::ZERO,
        );
        assert_eq!(policy.delay_for(1, Duration::ZERO), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2, Duration::ZERO), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3, Duration::ZERO), Duration::from_secs(8));
        assert_eq!(policy.delay_for(4, Duration::ZERO), Duration::from_secs(10));
        assert_eq!(policy.delay_for(64, Duration::ZERO), Duration::from_secs(10));
        assert_eq!(
            policy.delay_for(1, Duration::from_millis(300)),
            Duration::from_millis(2_300)
        );
        assert_eq!(
            policy.delay_for(3, Duration::from_secs(5)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn zero_attempts_clamp_to_one() {
        assert_eq!(BackoffPolicy::immediate(0).max_attempts(), 1);
    }

    #[test]
    fn jitter_stays_within_bound() {
        let policy = BackoffPolicy::new(
            3,
            Duration::ZERO,
            Duration::from_secs(1),
            Duration::from_millis(50),
        );
        for _ in 0..100 {
            assert!(policy.sample_jitter() <= Duration::from_millis(50));
        }
    }

    #[tokio::test]
    async fn always_failing_call_uses_every_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryFailure> = BackoffPolicy::immediate(3)
            .retry("download", "1", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let failure = result.err().map(|failure| failure.attempts);
        assert_eq!(failure, Some(3));
    }

    #[tokio::test]
    async fn success_on_attempt_k_stops_after_k_calls() {
        for k in 1..=3 {
            let calls = AtomicU32::new(0);
            let result = BackoffPolicy::immediate(3)
                .retry("download", "1", |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt < k {
                            Err(transient())
                        } else {
                            Ok(attempt)
                        }
                    }
                })
                .await;
            assert_eq!(result, Ok(k));
            assert_eq!(calls.load(Ordering::SeqCst), k);
        }
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryFailure> = BackoffPolicy::immediate(3)
            .retry("download", "1", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(RemoteError::Status {
                        operation: "download",
                        status: 404,
                    })
                }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(RetryFailure {
                attempts: 1,
                last: RemoteError::Status { status: 404, .. }
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_follow_the_schedule() {
        let policy = BackoffPolicy::new(
            3,
            Duration::from_secs(2),
            Duration::from_secs(10),
            Duration::ZERO,
        );
        let started = tokio::time::Instant::now();
        let result: Result<(), RetryFailure> = policy
            .retry("upload", "1", |_| async { Err(transient()) })
            .await;
        assert!(result.is_err());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(6));
        assert!(elapsed < Duration::from_secs(7));
    }

    #[test]
    fn retry_failure_message_names_attempts() {
        let failure = RetryFailure {
            attempts: 3,
            last: RemoteError::Status {
                operation: "download",
                status: 502,
            },
        };
        assert_eq!(
            failure.to_string(),
            "download returned status 502 (after 3 attempt(s))"
        );
    }
}
