//! Post-sync swarm health hook.
//!
//! After a successful run the reconciler hands the info hashes of the
//! releases it just touched to a [`SwarmScraper`]. The scraping protocol
//! itself (UDP tracker announce/scrape) lives outside this crate.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("tracker error: {0}")]
    Tracker(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Refreshes swarm statistics (seeders/leechers/completed) for releases.
#[async_trait]
pub trait SwarmScraper: Send + Sync {
    /// Update swarm statistics for the given release info hashes.
    async fn scrape(&self, info_hashes: &[String]) -> Result<(), ScrapeError>;
}
