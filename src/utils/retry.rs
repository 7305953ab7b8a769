//! Bounded retry for outbound requests
//!
//! Attempts run back to back with no delay between them. Callers decide
//! which errors are worth another attempt.

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, warn};

/// Run `operation` up to `max_retries + 1` times
///
/// `operation` receives the 1-based attempt number. An error is retried only
/// while attempts remain and `should_retry` accepts it; otherwise it is
/// returned as-is.
pub async fn retry<T, E, F, Fut, P>(
    max_retries: u32,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = max_retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(err) if attempt < max_attempts && should_retry(&err) => {
                warn!(
                    "Attempt {}/{} failed, retrying: {}",
                    attempt, max_attempts, err
                );
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn stops_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry(
            2,
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("connection refused".to_string()) }
            },
            |_| true,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry(
            5,
            |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err("reset".to_string())
                    } else {
                        Ok(attempt)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_retryable_errors_return_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry(
            4,
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("bad request".to_string()) }
            },
            |err| err != "bad request",
        )
        .await;

        assert_eq!(result, Err("bad request".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let calls = AtomicU32::new(0);
        let _: Result<(), String> = retry(
            0,
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("timeout".to_string()) }
            },
            |_| true,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
