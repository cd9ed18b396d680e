//! Retry-aware request execution.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::transport::TransportError;

/// Retry policy for request execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,
    /// Base delay between retries.
    pub base_delay: Duration,
    /// Whether to use exponential backoff.
    pub exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            exponential_backoff: false,
        }
    }
}

impl RetryPolicy {
    /// Create a retry policy with no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            exponential_backoff: false,
        }
    }

    /// Create a retry policy with fixed delays.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay: delay,
            exponential_backoff: false,
        }
    }

    /// Create a retry policy with exponential backoff.
    pub fn exponential(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            exponential_backoff: true,
        }
    }

    /// Calculate the delay for a given retry attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 || attempt > self.max_retries {
            return Duration::ZERO;
        }

        if self.exponential_backoff {
            // The exponent is capped so high attempt counts cannot overflow
            // the multiplier.
            let exponent = (attempt - 1).min(20);
            self.base_delay.saturating_mul(2_u32.pow(exponent))
        } else {
            self.base_delay
        }
    }
}

/// Runs requests against the transport, retrying transient failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestExecutor;

impl RequestExecutor {
    /// Invoke `call` until it succeeds, fails non-transiently, or the
    /// policy's retry budget runs out. `None` means a single attempt.
    ///
    /// Transient failures sleep `delay_for_attempt` between tries without
    /// blocking other tasks. A non-transient failure is surfaced
    /// immediately, after exactly one attempt. When the budget runs out the
    /// error reports the total number of attempts made.
    pub async fn execute<F, Fut>(&self, policy: Option<&RetryPolicy>, call: F) -> Result<Value>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<Value, TransportError>>,
    {
        let single = RetryPolicy::none();
        let policy = policy.unwrap_or(&single);

        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() => {
                    attempt += 1;

                    if attempt <= policy.max_retries {
                        let delay = policy.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt,
                            max_retries = policy.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            %error,
                            "retrying transient request failure"
                        );
                        if delay > Duration::ZERO {
                            tokio::time::sleep(delay).await;
                        }
                        continue;
                    }

                    return Err(ClientError::Transient {
                        attempts: attempt,
                        source: error,
                    });
                }
                Err(error) => return Err(ClientError::Request(error)),
            }
        }
    }
}
