//! HTTP retry with multiplicative backoff
//!
//! Transient remote failures (throttling, server-side errors, dropped
//! connections) are retried here so the callers only ever see a final
//! response or a final error.
//!
//! **Backoff strategy:**
//! - First retry waits `backoff_factor` seconds
//! - Each further retry doubles the wait
//! - At most `attempts` total requests

use std::future::Future;
use std::time::Duration;

use crate::types::SourceError;

/// Response status codes worth retrying.
pub const RETRY_STATUS_CODES: &[u16] = &[429, 500, 502, 503, 504];

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total request attempts, including the first one
    pub attempts: u32,
    /// Initial backoff in seconds
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff_factor: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Wait before the next attempt, given how many attempts completed.
    pub fn backoff_delay(&self, completed_attempts: u32) -> Duration {
        let doublings = completed_attempts.saturating_sub(1).min(16);
        Duration::from_secs_f64(self.backoff_factor * f64::from(1u32 << doublings))
    }
}

pub fn is_retryable_status(status: u16) -> bool {
    RETRY_STATUS_CODES.contains(&status)
}

/// Issue a request until it yields a non-retryable response or the
/// attempt budget runs out. The last response (or transport error) is
/// returned as-is; status handling stays with the caller.
pub async fn send_with_retry<F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut request: F,
) -> Result<reqwest::Response, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match request().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if !is_retryable_status(status) || attempt >= policy.attempts {
                    return Ok(response);
                }

                let delay = policy.backoff_delay(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    status,
                    delay_ms = delay.as_millis() as u64,
                    "Retryable response status, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                if attempt >= policy.attempts {
                    return Err(SourceError::Network(err.to_string()));
                }

                let delay = policy.backoff_delay(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Transport error, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
