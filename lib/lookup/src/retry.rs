//! Bounded retry for collaborator calls
//!
//! Every attempt runs under a timeout. Retryable failures back off
//! exponentially; once the budget is spent the last error is surfaced as
//! [`LookupError::RetriesExhausted`].

use crate::{LookupError, Result, RetryConfig};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    request_timeout: Duration,
    operation: &str,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_retries = config.max_retries;
    let mut last_error = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let backoff = config.backoff_for_attempt(attempt - 1);
            debug!(
                operation,
                attempt,
                max_retries,
                backoff_ms = backoff.as_millis() as u64,
                "Retrying after backoff"
            );
            sleep(backoff).await;
        }

        let error = match timeout(request_timeout, call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => LookupError::Timeout(request_timeout),
        };

        if !error.is_retryable() {
            return Err(error);
        }
        warn!(operation, attempt = attempt + 1, max_retries, err = %error, "Retryable lookup failure");
        last_error = Some(error);
    }

    let last = last_error.unwrap_or_else(|| LookupError::Network("no attempt made".to_string()));
    Err(LookupError::RetriesExhausted {
        operation: operation.to_string(),
        attempts: max_retries + 1,
        last: Box::new(last),
    })
}
