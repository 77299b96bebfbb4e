//! Bounded-time retry for connection establishment.
//!
//! The number of attempts is unbounded; only the wall-clock budget is. The
//! spacing between attempts comes from a `RetryStrategy` so callers can swap
//! the fixed interval for something else without touching the loop.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::Instant;

use crate::application::ports::Communicator;

/// Spacing between connection attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(3);

/// Decides how long to wait before the next attempt.
pub trait RetryStrategy {
    /// Delay after the `attempt`-th failure (1-based).
    fn delay(&self, attempt: u32) -> Duration;
}

/// The same delay after every failure. No jitter, no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval(pub Duration);

impl Default for FixedInterval {
    fn default() -> Self {
        Self(DEFAULT_RETRY_INTERVAL)
    }
}

impl RetryStrategy for FixedInterval {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// Repeats an operation until it succeeds or `timeout` has elapsed.
#[derive(Debug, Clone)]
pub struct Retrier<S = FixedInterval> {
    timeout: Duration,
    strategy: S,
}

impl Retrier<FixedInterval> {
    /// A retrier with the default three-second interval.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, FixedInterval::default())
    }
}

impl<S: RetryStrategy> Retrier<S> {
    #[must_use]
    pub fn new(timeout: Duration, strategy: S) -> Self {
        Self { timeout, strategy }
    }

    /// Call `attempt` until it returns `Ok`.
    ///
    /// The deadline is fixed before the first call. After each failure the
    /// retrier waits for whichever comes first: the strategy's delay (then
    /// tries again) or the deadline (then gives up).
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt once the deadline passes.
    pub async fn run<F, Fut, T>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut failures = 0u32;

        loop {
            let err = match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            failures += 1;
            tracing::warn!(attempt = failures, error = %err, "retryable error");

            tokio::select! {
                biased;
                () = tokio::time::sleep_until(deadline) => return Err(err),
                () = tokio::time::sleep(self.strategy.delay(failures)) => {}
            }
        }
    }
}

/// Connect `comm`, retrying within the given retrier's budget.
///
/// # Errors
///
/// Returns the last connection error once the budget is spent.
pub async fn establish<C: Communicator, S: RetryStrategy>(
    comm: &C,
    retrier: &Retrier<S>,
) -> Result<()> {
    retrier
        .run(|| comm.connect())
        .await
        .context("connecting to remote host")
}
