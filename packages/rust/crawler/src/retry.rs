//! Bounded retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::delay::{DelayStrategy, Pause};
use crate::fetch::FetchError;

/// Attempt `n` (1-based) that fails waits `n * base_delay` before the next
/// attempt. No wait follows the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Backoff after failed attempt `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Run `op` until it succeeds or the attempts are used up.
    pub async fn run<T, F, Fut>(
        &self,
        delay: &dyn DelayStrategy,
        url: &str,
        mut op: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last = FetchError::Transport("no attempt made".into());

        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if err.is_timeout() {
                        warn!(url, attempt, max = attempts, error = %err, "timeout loading page");
                    } else {
                        warn!(url, attempt, max = attempts, error = %err, "error loading page");
                    }
                    if attempt < attempts {
                        delay.pause(Pause::Backoff(self.backoff(attempt))).await;
                    }
                    last = err;
                }
            }
        }

        Err(FetchError::Exhausted {
            attempts,
            last: Box::new(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    /// Records every pause instead of sleeping.
    #[derive(Default)]
    struct RecordingDelay(Mutex<Vec<Pause>>);

    #[async_trait]
    impl DelayStrategy for RecordingDelay {
        async fn pause(&self, pause: Pause) {
            self.0.lock().unwrap().push(pause);
        }
    }

    #[tokio::test]
    async fn backoff_grows_linearly_between_attempts() {
        let delay = RecordingDelay::default();
        let policy = RetryPolicy::new(3, Duration::from_secs(3));
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = policy
            .run(&delay, "https://example.com", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Timeout(Duration::from_secs(30)))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            FetchError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(last.is_timeout());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(
            *delay.0.lock().unwrap(),
            vec![
                Pause::Backoff(Duration::from_secs(3)),
                Pause::Backoff(Duration::from_secs(6)),
            ]
        );
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let delay = RecordingDelay::default();
        let policy = RetryPolicy::new(5, Duration::from_millis(10));
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let value = policy
            .run(&delay, "u", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 2 {
                    Err(FetchError::Status(502))
                } else {
                    Ok(n)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(delay.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
