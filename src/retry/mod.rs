//! Exponential backoff around backend calls.
//! Only transient connectivity failures are retried; everything else is returned on the first
//! attempt. A lost connection marks the shared `NetworkStatus` offline until a call succeeds.
// region:    --- Imports
pub mod classifier;

use crate::error::BackendError;
use classifier::{is_connection_error, is_disconnect, NetworkStatus};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Retry Policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Delay before the attempt following `attempt`: `initial_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}
// endregion: --- Retry Policy

// region:    --- Retrier
#[derive(Debug, Clone, Default)]
pub struct Retrier {
    policy: RetryPolicy,
    network: NetworkStatus,
}

impl Retrier {
    pub fn new(policy: RetryPolicy, network: NetworkStatus) -> Self {
        Self { policy, network }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempt budget is spent.
    pub async fn retry<T, F, Fut>(&self, mut operation: F) -> Result<T, BackendError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut attempt = 0;
        loop {
            let err = match operation().await {
                Ok(value) => {
                    if !self.network.is_online() {
                        info!("{:<12} --> backend reachable again", "Retry");
                        self.network.set_online(true);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if is_disconnect(&err) && self.network.is_online() {
                warn!("{:<12} --> backend connection lost: {}", "Retry", err);
                self.network.set_online(false);
            }

            if !is_connection_error(&err, &self.network) {
                return Err(err);
            }
            if attempt >= self.policy.max_attempts {
                debug!(
                    "{:<12} --> giving up after {} attempts: {}",
                    "Retry",
                    attempt + 1,
                    err
                );
                return Err(err);
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                "{:<12} --> attempt {}/{} failed: {} (retrying in {:?})",
                "Retry",
                attempt + 1,
                self.policy.max_attempts + 1,
                err,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
// endregion: --- Retrier

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn retrier(max_attempts: u32, delay_ms: u64) -> Retrier {
        Retrier::new(
            RetryPolicy::new(max_attempts, Duration::from_millis(delay_ms)),
            NetworkStatus::online(),
        )
    }

    #[test]
    fn delays_double_each_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert_eq!(policy.delay_for(64), Duration::from_secs(u64::from(u32::MAX)));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_use_every_attempt_with_exponential_gaps() {
        let retrier = retrier(3, 1000);
        let started = Instant::now();
        let stamps = Arc::new(Mutex::new(Vec::new()));

        let result: Result<(), _> = retrier
            .retry(|| {
                let stamps = Arc::clone(&stamps);
                async move {
                    stamps.lock().unwrap().push(started.elapsed());
                    Err(BackendError::status("unavailable", "backend unreachable"))
                }
            })
            .await;

        assert!(result.is_err());
        let stamps = stamps.lock().unwrap().clone();
        assert_eq!(
            stamps,
            vec![
                Duration::ZERO,
                Duration::from_millis(1000),
                Duration::from_millis(3000),
                Duration::from_millis(7000),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_is_returned_after_one_attempt() {
        let retrier = retrier(3, 1000);
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<(), _> = retrier
            .retry(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(BackendError::status("permission-denied", "denied")) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        match result {
            Err(BackendError::Status { code, .. }) => assert_eq!(code, "permission-denied"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_once_the_backend_comes_back() {
        let retrier = retrier(3, 500);
        let calls = AtomicU32::new(0);

        let value = retrier
            .retry(|| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call < 2 {
                        Err(BackendError::status("unknown", "connection reset by peer"))
                    } else {
                        Ok(call)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_means_single_attempt() {
        let retrier = retrier(0, 1000);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retrier
            .retry(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(BackendError::status("unavailable", "down")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lost_connection_marks_network_offline_until_success() {
        let retrier = retrier(3, 100);
        let network = retrier.network().clone();
        let calls = AtomicU32::new(0);

        let value = retrier
            .retry(|| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                let online = network.is_online();
                async move {
                    match call {
                        0 => Err(BackendError::Database(sqlx::Error::PoolClosed)),
                        // offline makes an application error transient
                        1 => {
                            assert!(!online);
                            Err(BackendError::status("permission-denied", "denied"))
                        }
                        _ => Ok(call),
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert!(retrier.network().is_online());
    }

    #[tokio::test(start_paused = true)]
    async fn offline_retries_even_application_errors() {
        let retrier = retrier(2, 10);
        retrier.network().set_online(false);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retrier
            .retry(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(BackendError::status("permission-denied", "denied")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
// endregion: --- Tests
