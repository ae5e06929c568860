//! Types shared across the synchronization engine.

use thiserror::Error;

use crate::library::LibraryError;

/// A fatal synchronization error. Terminates the current run only; the
/// scheduler keeps going.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Retry budget exhausted on read timeouts.
    #[error("server timed out while handling the request, please try again later")]
    RetriesExhausted,

    /// HTTP error status from the remote service; never retried.
    #[error("server error {status} occurred while handling the request")]
    Remote { status: u16 },

    /// Transport failure other than a timeout.
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse server response: {0}")]
    Parse(String),

    /// Merge failure in the local store.
    #[error("library error: {0}")]
    Library(#[from] LibraryError),
}

/// Per-kind merged record counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeTotals {
    pub tags: u32,
    pub series: u32,
    pub episodes: u32,
    pub releases: u32,
}

impl MergeTotals {
    /// True when at least one record was merged.
    pub fn any(&self) -> bool {
        self.tags > 0 || self.series > 0 || self.episodes > 0 || self.releases > 0
    }

    /// Human-readable run summary.
    pub fn describe(&self) -> String {
        if self.any() {
            format!(
                "added/updated {} tags, {} series, {} episodes, and {} releases",
                self.tags, self.series, self.episodes, self.releases
            )
        } else {
            "no updates were found".to_string()
        }
    }
}
