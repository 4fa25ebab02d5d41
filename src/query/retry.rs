//! Retry policy shared by every data-fetch hook.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ErrorKind, QueryError};
use crate::config::duration_str;
use crate::fetch::FetchError;

/// Bounded exponential backoff with per-status overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry
    #[serde(default = "default_backoff_base", with = "duration_str")]
    pub backoff_base: Duration,

    /// Upper bound for any single delay
    #[serde(default = "default_backoff_max", with = "duration_str")]
    pub backoff_max: Duration,

    /// Statuses that end the query on the first failure
    #[serde(default = "default_no_retry_statuses")]
    pub no_retry_statuses: Vec<u16>,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base() -> Duration {
    Duration::from_secs(1)
}

fn default_backoff_max() -> Duration {
    Duration::from_secs(30)
}

fn default_no_retry_statuses() -> Vec<u16> {
    vec![404, 429]
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
            backoff_max: default_backoff_max(),
            no_retry_statuses: default_no_retry_statuses(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `retry` (0-based): `min(base * 2^retry, max)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        2u32.checked_pow(retry)
            .and_then(|factor| self.backoff_base.checked_mul(factor))
            .map_or(self.backoff_max, |d| d.min(self.backoff_max))
    }

    /// Whether a failure on attempt `attempt` (1-based) earns another try.
    pub fn should_retry(&self, error: &QueryError, attempt: u32) -> bool {
        if attempt >= self.max_attempts || error.kind == ErrorKind::InvalidResponse {
            return false;
        }
        !error
            .status
            .is_some_and(|s| self.no_retry_statuses.contains(&s))
    }
}

/// Run `op` until it succeeds or the policy gives up.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, QueryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => QueryError::from(e),
        };

        if !policy.should_retry(&error, attempt) {
            if attempt > 1 || error.kind == ErrorKind::Transient {
                warn!("{} failed after {} attempt(s): {}", label, attempt, error);
            }
            return Err(error);
        }

        let delay = policy.delay_for(attempt - 1);
        warn!(
            "{} failed (attempt {}/{}), retrying in {:?}: {}",
            label, attempt, policy.max_attempts, delay, error
        );
        tokio::time::sleep(delay).await;
    }
}
