use std::{fmt::Display, future::Future, time::Duration};

use log::warn;

/// Bounded exponential backoff used while a dependency is still starting up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// At least one attempt is always made. The backoff doubles after every
    /// failure and is capped at sixteen times the initial value.
    pub fn new(attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_backoff,
            max_backoff: initial_backoff.saturating_mul(16),
        }
    }

    /// Wait before retry number `attempt + 1` (zero based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_backoff)
    }
}

/// Runs `op` until it succeeds or the policy is exhausted, returning the last
/// error in the latter case.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 < policy.attempts => {
                let backoff = policy.backoff(attempt);
                warn!(
                    "{what} not ready (attempt {}/{}): {e}, retrying in {:.1}s",
                    attempt + 1,
                    policy.attempts,
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
