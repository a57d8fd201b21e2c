//! Retry logic.
//!
//! # Responsibilities
//! - Execute an operation up to `max_retries + 1` times
//! - Stop immediately on errors the caller classifies as non-retryable
//! - Sleep a jittered exponential backoff between attempts

use std::fmt::Display;
use std::future::Future;

use crate::config::BackoffConfig;
use crate::resilience::backoff::delay_for_retry;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    pub backoff: BackoffConfig,
}

impl RetryPolicy {
    /// Total number of attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Why a retried operation gave up.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// A non-retryable error ended the loop.
    Aborted { attempt: u32, error: E },
    /// Every attempt failed with a retryable error.
    Exhausted { attempts: u32, last: E },
}

/// Run `op` until it succeeds, fails fatally, or the policy is exhausted.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if !is_retryable(&error) => {
                tracing::debug!(operation, attempt, error = %error, "Non-retryable error");
                return Err(RetryError::Aborted { attempt, error });
            }
            Err(last) if attempt >= max_attempts => {
                tracing::warn!(operation, attempts = attempt, error = %last, "Retries exhausted");
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last,
                });
            }
            Err(error) => {
                let delay = delay_for_retry(attempt, &policy.backoff);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
