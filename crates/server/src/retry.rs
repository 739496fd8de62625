//! Retry-with-backoff wrapper for flaky outbound calls (embeddings, LLM
//! rewriting). Kept as a thin wrapper around the call site rather than
//! woven into the pipeline itself, so the core pipeline stays free of
//! retry/backoff concerns entirely.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry `f` up to `max_attempts` times with exponential backoff starting
/// at `base_delay`, doubling each attempt. Returns the last error if every
/// attempt fails.
pub async fn with_retry<T, E, F, Fut>(max_attempts: u32, base_delay: Duration, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < max_attempts => {
                let delay = base_delay * 2u32.pow(attempt);
                warn!(attempt, %err, delay_ms = delay.as_millis() as u64, "retrying after failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
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
    async fn succeeds_without_retrying_on_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(3, Duration::from_millis(1), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success_within_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(5, Duration::from_millis(1), || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err("not yet".to_string())
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(3, Duration::from_millis(1), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<u32, String>("always fails".to_string())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
