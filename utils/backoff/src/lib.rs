//! Retry policy shared by every client that talks to an upstream service
//! (search store, completion API, remote embeddings).
//!
//! Only errors the caller classifies as recoverable are retried; everything
//! else is returned on the first failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

const DEFAULT_MAX_ATTEMPTS: usize = 5;
const DEFAULT_BASE_DELAY_MS: u64 = 500;
/// Delays stop doubling after this many retries.
const MAX_EXPONENT: u32 = 5;

/// Bounded retry with exponential backoff and optional jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    max_attempts: usize,

    /// Delay before the first retry; doubled for every further retry.
    base_delay: Duration,

    /// Upper bound on any single delay.
    max_delay: Duration,

    /// Whether to randomize each delay within `[delay / 2, delay]`.
    jitter: bool,
}

impl RetryPolicy {
    /// Create a policy allowing `max_attempts` attempts in total.
    pub fn new(max_attempts: usize) -> Self {
        let base_delay = Duration::from_millis(DEFAULT_BASE_DELAY_MS);
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: base_delay * (1 << MAX_EXPONENT),
            jitter: true,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Set the delay before the first retry.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the upper bound on a single delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Disable jitter, making delays fully deterministic.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Deterministic (pre-jitter) delay before retry number `retry` (1-based).
    pub fn base_delay_for(&self, retry: usize) -> Duration {
        let exponent = retry.saturating_sub(1).min(MAX_EXPONENT as usize) as u32;
        self.base_delay
            .saturating_mul(1 << exponent)
            .min(self.max_delay)
    }

    /// Delay to sleep before retry number `retry` (1-based), jitter applied.
    pub fn delay_for(&self, retry: usize) -> Duration {
        let delay = self.base_delay_for(retry);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let half = delay / 2;
        let spread_ms = u64::try_from(half.as_millis()).unwrap_or(u64::MAX);
        let extra = rand::rng().random_range(0..=spread_ms);
        half + Duration::from_millis(extra)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is exhausted. The last error is returned on failure.
    pub async fn retry<T, E, F, Fut, R>(&self, label: &str, mut op: F, is_retryable: R) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 1usize;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{label} failed (attempt {attempt}/{}): {err}; retrying in {delay:?}",
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}
