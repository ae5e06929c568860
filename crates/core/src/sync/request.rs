//! Network request policy.
//!
//! Every catalog call goes through [`RequestPolicy::run`]: read timeouts are
//! retried with a fixed delay up to the attempt budget, HTTP error statuses
//! fail the run immediately.

use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

use crate::metrics;
use crate::remote::RemoteError;

use super::SyncError;

/// Retry knobs applied to every network call of a run.
#[derive(Debug, Clone, Copy)]
pub struct RequestPolicy {
    /// Attempts per call (at least 1).
    pub retries: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl RequestPolicy {
    pub fn new(retries: u32, retry_delay: Duration) -> Self {
        Self {
            retries: retries.max(1),
            retry_delay,
        }
    }

    /// Issue `op`, retrying on read timeouts only.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, SyncError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut attempts_left = self.retries.max(1);
        loop {
            attempts_left -= 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(RemoteError::Timeout) => {
                    if attempts_left == 0 {
                        error!("Server timed out while handling the request, giving up");
                        return Err(SyncError::RetriesExhausted);
                    }
                    warn!("Server timed out while handling the request, retrying");
                    metrics::REMOTE_RETRIES.inc();
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(RemoteError::Status { status }) => {
                    error!(
                        "Server error {} occurred while handling the request, giving up",
                        status
                    );
                    return Err(SyncError::Remote { status });
                }
                Err(RemoteError::Network(message)) => return Err(SyncError::Network(message)),
                Err(RemoteError::Parse(message)) => return Err(SyncError::Parse(message)),
            }
        }
    }
}
