//! Retry policy for best-effort persistence.
//!
//! Chat turns are persisted after the transcript has already been updated,
//! so a failed write never rolls anything back. The policy only decides how
//! many times a write is attempted before the failure is logged and dropped.

use std::future::Future;
use std::time::Duration;

use sitepulse_db::StoreError;

/// How many times to attempt a persistence call, with linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub attempts: u32,
    /// Delay before attempt `n + 1` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for PersistPolicy {
    fn default() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::from_millis(250),
        }
    }
}

impl PersistPolicy {
    pub fn with_attempts(attempts: u32, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// Each failure is logged at `warn`; the last error is returned.
    pub async fn run<T, F, Fut>(&self, what: &'static str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    tracing::warn!(what, attempt, attempts, error = %e, "Persistence attempt failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
