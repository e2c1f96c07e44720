use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Errors that know whether repeating the same call could succeed.
pub trait Retryable: std::error::Error {
    fn is_transient(&self) -> bool;
}

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
    backoff_max: Duration,
    enabled: bool,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        backoff_base: Duration,
        backoff_max: Duration,
        enabled: bool,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
            backoff_max,
            enabled,
        }
    }

    /// Single attempt, no waiting.
    pub fn disabled() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts
        } else {
            1
        }
    }

    /// Exponential backoff capped at `backoff_max`; attempt 0 never waits.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if !self.enabled || attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2_u64.saturating_pow(attempt - 1);
        let backoff_ms = (self.backoff_base.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(backoff_ms.min(self.backoff_max.as_millis() as u64))
    }

    pub async fn wait_before_retry(&self, attempt: u32) {
        let backoff = self.backoff_for(attempt);
        if backoff.is_zero() {
            return;
        }
        debug!("Retrying in {:?} (attempt {})", backoff, attempt);
        sleep(backoff).await;
    }

    pub fn should_retry<E: Retryable>(&self, attempt: u32, error: &E) -> bool {
        if !self.enabled {
            return false;
        }

        if attempt >= self.max_attempts {
            debug!("Max retry attempts ({}) reached", self.max_attempts);
            return false;
        }

        if error.is_transient() {
            debug!("Error is retryable: {}", error);
            true
        } else {
            warn!("Error is not retryable: {}", error);
            false
        }
    }
}

pub async fn retry_with_policy<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Retryable,
{
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            policy.wait_before_retry(attempt).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("Operation succeeded after {} retries", attempt);
                }
                return Ok(result);
            }
            Err(error) => {
                warn!("Operation failed on attempt {}: {}", attempt + 1, error);
                attempt += 1;
                if !policy.should_retry(attempt, &error) {
                    return Err(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    #[error("{message}")]
    struct TestError {
        message: String,
        transient: bool,
    }

    impl TestError {
        fn transient(message: &str) -> Self {
            Self { message: message.to_string(), transient: true }
        }

        fn permanent(message: &str) -> Self {
            Self { message: message.to_string(), transient: false }
        }
    }

    impl Retryable for TestError {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    #[tokio::test]
    async fn test_retry_policy_success_first_try() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(100), true);

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_policy(&policy, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<i32, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_policy_success_after_retries() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(10), true);

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_policy(&policy, || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError::transient("temporary failure"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_policy_max_attempts_reached() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(10), true);

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_policy(&policy, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, TestError>(TestError::transient("always fails"))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_policy_permanent_error_not_retried() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(10), true);

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_policy(&policy, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, TestError>(TestError::permanent("bad payload"))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_policy_disabled() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(100), false);

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_policy(&policy, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, TestError>(TestError::transient("failure"))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1); // Only one attempt when disabled
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(6, Duration::from_millis(100), Duration::from_millis(350), true);
        assert_eq!(policy.backoff_for(0), Duration::ZERO);
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(350));
    }
}
