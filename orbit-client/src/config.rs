//! Configuration types for the orbit-sdk crate.

use std::time::Duration;

use crate::executor::RetryPolicy;

/// Configuration for an [`OrbitClient`](crate::OrbitClient).
///
/// Only the operations the platform treats as idempotent carry a retry
/// budget by default; everything else runs as a single attempt.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Retry budget for pushing records to a stream
    /// Default: 5 retries, fixed 300ms delay
    pub push_retry: RetryPolicy,

    /// Retry budget for read-side stream requests (last update, search)
    /// Default: 3 retries, fixed 500ms delay
    pub read_retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            push_retry: RetryPolicy::fixed(5, Duration::from_millis(300)),
            read_retry: RetryPolicy::fixed(3, Duration::from_millis(500)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_budgets() {
        let config = ClientConfig::default();
        assert_eq!(
            config.push_retry,
            RetryPolicy::fixed(5, Duration::from_millis(300))
        );
        assert_eq!(
            config.read_retry,
            RetryPolicy::fixed(3, Duration::from_millis(500))
        );
    }
}
