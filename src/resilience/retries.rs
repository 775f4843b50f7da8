//! Retry logic.
//!
//! # Responsibilities
//! - Run one logical operation up to `max_retries + 1` times
//! - Bound every attempt by its own timeout
//! - Sleep `base * 2^n` before retry n, observing cancellation
//!
//! # Design Decisions
//! - Independent of any HTTP client: the caller supplies the operation and
//!   a classifier over its outcome
//! - When the budget runs out on a retryable *success value* (e.g. a 503
//!   response), that value is returned and the caller maps it
//! - Cancellation is checked before each attempt and raced against every
//!   attempt and backoff sleep

use std::future::Future;
use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::ImdbConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Bounded retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Deadline applied to each attempt independently.
    pub per_attempt_timeout: Duration,
    /// Base of the exponential schedule.
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ImdbConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            per_attempt_timeout: config.timeout(),
            backoff_base: config.backoff_base(),
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry `retry` (1-indexed).
    pub fn delay_for(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.backoff_base)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ImdbConfig::default())
    }
}

/// Classifier verdict for one attempt outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Done,
}

/// Why a retried operation did not produce a value.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The last attempt failed; either non-retryable or the budget ran out.
    #[error("failed after {attempts} attempt(s): {source}")]
    Failed {
        attempts: u32,
        #[source]
        source: E,
    },

    /// The last attempt hit the per-attempt deadline.
    #[error("timed out after {attempts} attempt(s) of {timeout:?} each")]
    TimedOut { attempts: u32, timeout: Duration },

    #[error("cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Failed { attempts, .. }
            | RetryError::TimedOut { attempts, .. }
            | RetryError::Cancelled { attempts } => *attempts,
        }
    }
}

/// 5xx, 408 and 429 are worth another try.
pub fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Run `operation` under `policy`.
///
/// `operation` receives the 1-indexed attempt number. Timed-out attempts are
/// always treated as transient.
pub async fn with_retry<T, E, Op, Fut, C>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    classify: C,
    mut operation: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&Result<T, E>) -> RetryDecision,
{
    let total = policy.total_attempts();
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled { attempts: attempt });
        }
        attempt += 1;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts: attempt }),
            outcome = tokio::time::timeout(policy.per_attempt_timeout, operation(attempt)) => outcome,
        };

        match outcome {
            Ok(result) => {
                if classify(&result) == RetryDecision::Done || attempt >= total {
                    return result.map_err(|source| RetryError::Failed {
                        attempts: attempt,
                        source,
                    });
                }
            }
            Err(_) if attempt >= total => {
                return Err(RetryError::TimedOut {
                    attempts: attempt,
                    timeout: policy.per_attempt_timeout,
                });
            }
            Err(_) => {
                tracing::debug!(attempt, timeout = ?policy.per_attempt_timeout, "Attempt timed out");
            }
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(attempt, of = total, delay = ?delay, "Transient failure, backing off");
        metrics::record_retry();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled { attempts: attempt }),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            per_attempt_timeout: Duration::from_secs(10),
            backoff_base: Duration::from_secs(1),
        }
    }

    fn retry_errors(result: &Result<u32, &'static str>) -> RetryDecision {
        match result {
            Err(_) => RetryDecision::Retry,
            Ok(_) => RetryDecision::Done,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let c = calls.clone();
        let result = with_retry(&policy(3), &CancellationToken::new(), retry_errors, |_| {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("boom")
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_secs(2 + 4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<u32, _> =
            with_retry(&policy(3), &CancellationToken::new(), |_| RetryDecision::Done, |_| {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<u32, _>("bad input")
                }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Failed { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = with_retry(&policy(3), &CancellationToken::new(), retry_errors, |_| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err("still down")
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_success_value_is_returned() {
        let result = with_retry(
            &policy(1),
            &CancellationToken::new(),
            |r: &Result<u16, &'static str>| match r {
                Ok(503) => RetryDecision::Retry,
                _ => RetryDecision::Done,
            },
            |_| async { Ok(503) },
        )
        .await;
        assert_eq!(result.unwrap(), 503);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_applies_per_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let start = Instant::now();
        let result = with_retry(&policy(1), &CancellationToken::new(), retry_errors, |_| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(1)
            }
        })
        .await;

        assert!(matches!(result, Err(RetryError::TimedOut { attempts: 2, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // two 10s attempts plus one 2s backoff
        assert!(start.elapsed() >= Duration::from_secs(22));
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_backoff() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = with_retry(&policy(3), &cancel, retry_errors, |_| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err("down")
            }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 1 })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = with_retry(&policy(3), &cancel, retry_errors, |_| async { Ok(1) }).await;
        assert!(matches!(result, Err(RetryError::Cancelled { attempts: 0 })));
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient_status(StatusCode::REQUEST_TIMEOUT));
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient_status(StatusCode::NOT_FOUND));
        assert!(!is_transient_status(StatusCode::UNAUTHORIZED));
        assert!(!is_transient_status(StatusCode::OK));
    }

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.total_attempts(), 4);
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.per_attempt_timeout, Duration::from_secs(10));
    }
}
