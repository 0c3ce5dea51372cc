//! Polling helpers used where an operator would otherwise wait by hand.

use crate::utils::error::{CmError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Calls `check` until it yields a value or `settings.timeout` elapses.
///
/// `Ok(None)` and not-found errors mean "not there yet". Any other error
/// is returned immediately.
pub async fn poll_until<T, F, Fut>(settings: PollSettings, what: &str, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    let deadline = started
        .checked_add(settings.timeout)
        .ok_or_else(|| CmError::InvalidConfigValueError {
            field: "polling timeout".to_string(),
            value: format!("{:?}", settings.timeout),
            reason: "timeout is too large".to_string(),
        })?;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match check().await {
            Ok(Some(value)) => {
                tracing::debug!("⏳ {} ready after {} attempt(s)", what, attempts);
                return Ok(value);
            }
            Ok(None) => tracing::debug!("⏳ {} not ready (attempt {})", what, attempts),
            Err(e) if e.is_not_found() => {
                tracing::debug!("⏳ {} not ready (attempt {}): {}", what, attempts, e)
            }
            Err(e) => return Err(e),
        }

        match Instant::now().checked_add(settings.interval) {
            Some(next) if next <= deadline => sleep(settings.interval).await,
            _ => break,
        }
    }

    Err(CmError::TimeoutError {
        what: what.to_string(),
        waited: started.elapsed(),
    })
}

/// Polls a lookup that fails with not-found until the resource exists.
pub async fn wait_for<T, F, Fut>(settings: PollSettings, what: &str, mut lookup: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    poll_until(settings, what, || {
        let fut = lookup();
        async move { fut.await.map(Some) }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_settings() -> PollSettings {
        PollSettings::new(Duration::from_millis(5), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_returns_once_check_succeeds() {
        let calls = AtomicU32::new(0);
        let value = poll_until(fast_settings(), "tenant", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(if n >= 2 { Some("ready") } else { None }) }
        })
        .await
        .unwrap();

        assert_eq!(value, "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_retried() {
        let calls = AtomicU32::new(0);
        let id = wait_for(fast_settings(), "instance", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(CmError::NotFoundError {
                        message: "Unable to find BIG-IP Next instance".to_string(),
                    })
                } else {
                    Ok("i-9".to_string())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(id, "i-9");
    }

    #[tokio::test]
    async fn test_times_out() {
        let settings = PollSettings::new(Duration::from_millis(10), Duration::from_millis(35));
        let err = poll_until(settings, "tenant JuiceShopTenant", || async {
            Ok::<Option<()>, CmError>(None)
        })
        .await
        .unwrap_err();

        match err {
            CmError::TimeoutError { what, .. } => assert_eq!(what, "tenant JuiceShopTenant"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_huge_timeout_is_an_error_not_a_panic() {
        let settings = PollSettings::new(Duration::from_millis(5), Duration::from_secs(u64::MAX));
        let err = poll_until(settings, "tenant", || async { Ok::<Option<()>, CmError>(None) })
            .await
            .unwrap_err();

        assert!(matches!(err, CmError::InvalidConfigValueError { .. }));
    }

    #[tokio::test]
    async fn test_huge_interval_stops_after_one_attempt() {
        let calls = AtomicU32::new(0);
        let settings = PollSettings::new(Duration::from_secs(u64::MAX), Duration::from_millis(50));
        let err = poll_until(settings, "tenant", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<Option<()>, CmError>(None) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CmError::TimeoutError { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_abort() {
        let calls = AtomicU32::new(0);
        let err = poll_until(fast_settings(), "tenant", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<Option<()>, _>(CmError::AuthenticationError {
                    status: "401".to_string(),
                })
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CmError::AuthenticationError { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
