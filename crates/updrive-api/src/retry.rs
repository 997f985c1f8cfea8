//! Transport retry with exponential backoff
//!
//! Every remote operation is retried here, below the port, until it
//! succeeds or the budget is exhausted. The reconciler above the port
//! never retries: by the time it sees an error, backoff has already run
//! its course.
//!
//! Backoff schedule: `base, base*2, base*4, ...`, capped at the configured
//! ceiling. Only transient failures (connect, timeout, 429, 5xx) are
//! retried; a 4xx is a fact about the request and comes back immediately.

use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use updrive_core::config::TransportConfig;

/// Backoff policy for one remote operation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries on top of the initial attempt
    pub retries: u32,
    /// Base delay, doubled per attempt
    pub base_delay: Duration,
    /// Ceiling for a single delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Build the policy from the transport section of the configuration
    #[must_use]
    pub fn from_config(transport: &TransportConfig) -> Self {
        Self {
            retries: transport.retries,
            base_delay: Duration::from_secs(transport.backoff_base_secs),
            max_delay: Duration::from_secs(transport.backoff_cap_secs),
        }
    }

    /// Delay before the given retry (0-indexed): `min(base * 2^attempt, cap)`
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor);
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TransportConfig::default())
    }
}

/// Whether an error is worth retrying
///
/// Transient: network-level failures (connect, timeout, interrupted
/// transfer), rate limiting (429) and server errors (5xx). Everything
/// else, 4xx in particular, is permanent for this attempt.
pub fn is_transient(err: &anyhow::Error) -> bool {
    for cause in err.chain() {
        if let Some(req_err) = cause.downcast_ref::<reqwest::Error>() {
            if req_err.is_timeout() || req_err.is_connect() {
                return true;
            }
            if let Some(status) = req_err.status() {
                return status.as_u16() == 429 || status.is_server_error();
            }
            // Request-phase failures without a status are connection-level
            if req_err.is_request() || req_err.is_body() {
                return true;
            }
        }
        if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
            use std::io::ErrorKind;
            return matches!(
                io_err.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::ConnectionRefused
                    | ErrorKind::BrokenPipe
                    | ErrorKind::TimedOut
            );
        }
    }
    false
}

/// Executes an async operation with exponential backoff retry
///
/// Returns the first `Ok`, or the error of the final attempt once the
/// budget is exhausted or a non-transient error occurs.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    for attempt in 0..=policy.retries {
        match f().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(operation, attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if attempt < policy.retries && is_transient(&err) {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %format!("{err:#}"),
                        "Transient error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    return Err(err);
                }
            }
        }
    }

    unreachable!("retry loop returns on the final attempt")
}
