//! Bounded exponential backoff for transient provider failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::EmbedError;

/// How many times, and how patiently, to retry a failed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 means a single attempt).
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Delay before retry number `retry` (0-based): base * 2^retry, capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.min(16));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, EmbedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EmbedError>>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry < self.max_retries => {
                    let delay = err
                        .retry_after()
                        .map(|d| d.min(self.max_delay))
                        .unwrap_or_else(|| self.backoff(retry));
                    warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        operation,
                        err,
                        retry + 1,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(10), Duration::from_secs(8));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = fast(3)
            .run("embed", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(EmbedError::Timeout)
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result, Ok(7));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = fast(3)
            .run("embed", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EmbedError::Authentication {
                    status: 401,
                    body: "bad key".into(),
                })
            })
            .await;
        assert!(matches!(result, Err(EmbedError::Authentication { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = fast(2)
            .run("embed", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EmbedError::Server {
                    status: 503,
                    body: String::new(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
