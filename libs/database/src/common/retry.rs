use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed-interval schedule for the startup connection probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts made after the first one fails
    pub max_retries: u32,

    /// Pause between two attempts
    pub delay: Duration,
}

impl RetryConfig {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total number of attempts, counting the first one
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryConfig {
    /// 5 attempts, 2 seconds apart
    fn default() -> Self {
        Self::new(4, Duration::from_secs(2))
    }
}

/// Run `operation` until it succeeds or the schedule is exhausted.
///
/// The last error is returned when every attempt fails.
pub async fn retry_with_delay<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) if attempt >= config.total_attempts() => {
                warn!("Operation failed after {} attempts: {}", attempt, e);
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    config.total_attempts(),
                    e,
                    config.delay
                );
                tokio::time::sleep(config.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_op(
        counter: Arc<AtomicU32>,
        succeed_on: u32,
    ) -> impl FnMut() -> std::future::Ready<Result<&'static str, String>> {
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n >= succeed_on {
                Ok("connected")
            } else {
                Err(format!("attempt {} refused", n))
            })
        }
    }

    #[test]
    fn test_default_is_five_attempts_two_seconds_apart() {
        let config = RetryConfig::default();
        assert_eq!(config.total_attempts(), 5);
        assert_eq!(config.delay, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_first_attempt_success_does_not_sleep() {
        let counter = Arc::new(AtomicU32::new(0));
        let config = RetryConfig::new(4, Duration::from_secs(60));

        let result = retry_with_delay(counting_op(counter.clone(), 1), config).await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_failures_with_fixed_delay() {
        let counter = Arc::new(AtomicU32::new(0));
        let start = std::time::Instant::now();
        let config = RetryConfig::new(4, Duration::from_millis(50));

        let result = retry_with_delay(counting_op(counter.clone(), 3), config).await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // Two pauses of 50ms each
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_gives_up_with_last_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let config = RetryConfig::new(2, Duration::from_millis(10));

        let result = retry_with_delay(counting_op(counter.clone(), u32::MAX), config).await;

        assert_eq!(result.unwrap_err(), "attempt 3 refused");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
