//! Retry policy shared by the list and delete call sites.
//!
//! Wraps `backon::ExponentialBuilder`. The defaults used by cleanup retry
//! immediately (zero delay), but a policy can be given a real backoff.

use backon::{ExponentialBuilder, Retryable};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// How many times to call an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total calls, including the first one
    pub max_attempts: u32,
    /// Delay before the second call
    pub min_delay: Duration,
    /// Cap on the delay between calls
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub factor: f32,
}

impl RetryPolicy {
    /// Retry up to `max_attempts` calls in total without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            factor: 1.0,
        }
    }

    /// Use exponential backoff between calls
    pub fn with_backoff(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self.factor = 2.0;
        self
    }

    fn builder(&self) -> ExponentialBuilder {
        // backon counts retries, not calls
        let retries = self.max_attempts.max(1) - 1;
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(retries as usize)
    }

    /// Run `op` until it succeeds or the attempts run out.
    ///
    /// Returns the last error on exhaustion. Failed attempts that will be
    /// retried are logged at debug level under `operation`.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        op.retry(self.builder())
            .notify(|e: &E, dur: Duration| {
                debug!(
                    operation,
                    delay = ?dur,
                    error = %e,
                    "Attempt failed, retrying"
                );
            })
            .await
    }
}
