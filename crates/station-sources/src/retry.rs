//! Shared retry-with-backoff policy for upstream calls.
//!
//! Every adapter wraps its whole network exchange in [`RetryPolicy::run`].
//! All error kinds are retried, including malformed payloads: upstream
//! flakiness is the common case and a second request usually succeeds.

use std::future::Future;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};

/// Retry configuration applied uniformly to all adapters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Each subsequent delay is the previous one times this factor.
    pub multiplier: f64,
    /// Upper bound on a single attempt; exceeding it counts as a failed attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            multiplier: 1.5,
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy with no waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            multiplier: 1.0,
            ..Self::default()
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// The sleeps between attempts, in order.
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial_delay;
        for _ in 1..self.max_attempts.max(1) {
            delays.push(delay);
            delay = delay.mul_f64(self.multiplier);
        }
        delays
    }

    /// Run `op` until it succeeds or attempts are exhausted.
    ///
    /// `op` receives the 1-based attempt number. The last error is returned.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> SourceResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delays = self.delays().into_iter();
        let mut attempt = 1;

        loop {
            let outcome = match tokio::time::timeout(self.attempt_timeout, op(attempt)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(SourceError::Timeout(self.attempt_timeout)),
            };

            let err = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(source = label, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if attempt >= max_attempts {
                warn!(
                    source = label,
                    attempts = attempt,
                    error = %err,
                    "Giving up after exhausting retries"
                );
                return Err(err);
            }

            let delay = delays.next().unwrap_or(self.initial_delay);
            warn!(
                source = label,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Upstream call failed, retrying"
            );
            counter!("source_retry_total", "source" => label.to_string()).increment(1);

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
