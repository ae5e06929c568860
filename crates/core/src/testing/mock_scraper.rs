//! Mock swarm scraper for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::scraper::{ScrapeError, SwarmScraper};

/// Mock implementation of the [`SwarmScraper`] trait.
///
/// Records every batch of info hashes it receives; can be configured to fail.
#[derive(Default)]
pub struct MockSwarmScraper {
    scraped: RwLock<Vec<Vec<String>>>,
    should_fail: RwLock<bool>,
}

impl MockSwarmScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    /// Batches received so far, in order.
    pub async fn scraped_batches(&self) -> Vec<Vec<String>> {
        self.scraped.read().await.clone()
    }
}

#[async_trait]
impl SwarmScraper for MockSwarmScraper {
    async fn scrape(&self, info_hashes: &[String]) -> Result<(), ScrapeError> {
        self.scraped.write().await.push(info_hashes.to_vec());
        if *self.should_fail.read().await {
            return Err(ScrapeError::Tracker("mock failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_batches() {
        let scraper = MockSwarmScraper::new();
        scraper
            .scrape(&["abc".to_string(), "def".to_string()])
            .await
            .unwrap();

        let batches = scraper.scraped_batches().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec!["abc".to_string(), "def".to_string()]);
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let scraper = MockSwarmScraper::new();
        scraper.set_should_fail(true).await;

        let result = scraper.scrape(&["abc".to_string()]).await;
        assert!(result.is_err());
        // The batch is still recorded
        assert_eq!(scraper.scraped_batches().await.len(), 1);
    }
}
