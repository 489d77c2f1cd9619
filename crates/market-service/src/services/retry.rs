//! Retry loop for optimistic transactions

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use super::error::{ServiceError, ServiceResult};

const BASE_DELAY_MS: u64 = 5;
const MAX_DELAY_MS: u64 = 250;

/// Attempt budget and backoff for one optimistic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_max_attempts(5)
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(BASE_DELAY_MS),
            max_delay: Duration::from_millis(MAX_DELAY_MS),
        }
    }

    /// Exponential delay before attempt `attempt + 1`, with up to 50% random jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
            .min(self.max_delay);
        let jitter_ms = rand::thread_rng().gen_range(0..=exp.as_millis() as u64 / 2);
        exp + Duration::from_millis(jitter_ms)
    }

    /// Run `attempt` until it succeeds, fails permanently, or the budget runs out.
    ///
    /// Only transient errors (conflicts, store hiccups) are retried. Each
    /// attempt must start a fresh transaction.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> ServiceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        let mut tries = 0;
        loop {
            tries += 1;
            match attempt().await {
                Err(e) if e.is_transient() => {
                    if tries >= self.max_attempts {
                        warn!(operation, attempts = tries, error = %e, "Giving up on transaction");
                        return Err(ServiceError::RetriesExhausted {
                            operation,
                            attempts: tries,
                        });
                    }
                    let delay = self.backoff(tries);
                    warn!(
                        operation,
                        attempt = tries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transaction conflict, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}
