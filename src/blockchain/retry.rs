//! Per-request retry policy for the fetch client.
//!
//! A rate-limited request waits for the server's `Retry-After` when one is sent,
//! otherwise for the next step of an exponential schedule. The number of calls
//! to the wrapped operation never exceeds `max_attempts`.

use crate::blockchain::client::ClientError;
use crate::config::Config;
use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_base_delay,
            max_delay: config.retry_max_delay,
        }
    }

    /// Delays between attempts: base, 2x base, 4x base, ... one fewer than the attempt budget.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_attempts.saturating_sub(1))
            .build()
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the attempt
/// budget runs out.
pub async fn retry_batch<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut backoff = policy.backoff();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Request succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() => err,
            Err(err) => return Err(err),
        };

        // Advance the schedule even when the server dictates the delay so the
        // attempt budget stays the same either way.
        let Some(scheduled) = backoff.next() else {
            warn!("Retry budget exhausted after {} attempts: {}", attempt, err);
            return Err(ClientError::RetriesExhausted {
                attempts: attempt,
                last: Box::new(err),
            });
        };

        let delay = match err.retry_after() {
            Some(server_delay) => {
                warn!(
                    "Rate limited, respecting Retry-After of {:?} (attempt {}/{})",
                    server_delay, attempt, policy.max_attempts
                );
                server_delay
            }
            None => {
                warn!(
                    "Retryable error: {}; backing off {:?} (attempt {}/{})",
                    err, scheduled, attempt, policy.max_attempts
                );
                scheduled
            }
        };

        sleep(delay).await;
    }
}
