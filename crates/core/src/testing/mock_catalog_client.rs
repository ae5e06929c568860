//! Mock catalog client for testing.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::remote::{
    CatalogClient, ChangedSince, RemoteEpisode, RemoteError, RemoteRelease, RemoteSeries,
    RemoteSeriesTag, RemoteTag,
};

/// A recorded network call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Operation name ("all_series", "episodes_with_ids", ...).
    pub op: String,
    /// Requested identifiers (empty for `all` and `changed_since` calls).
    pub ids: Vec<i64>,
}

/// Mock implementation of the [`CatalogClient`] trait.
///
/// Provides controllable behavior for testing:
/// - Serve configured payloads; `with-ids` calls return the configured
///   records matching the requested ids
/// - Record every call, in order, for assertions
/// - Inject failures consumed one per call
/// - Simulate slow responses
#[derive(Default)]
pub struct MockCatalogClient {
    tags: RwLock<Vec<RemoteTag>>,
    series: RwLock<Vec<RemoteSeries>>,
    series_tags: RwLock<Vec<RemoteSeriesTag>>,
    episodes: RwLock<Vec<RemoteEpisode>>,
    releases: RwLock<Vec<RemoteRelease>>,
    changed: RwLock<ChangedSince>,
    calls: RwLock<Vec<RecordedCall>>,
    failures: RwLock<VecDeque<RemoteError>>,
    op_failures: RwLock<HashMap<String, VecDeque<RemoteError>>>,
    delay: RwLock<Option<Duration>>,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_tags(&self, tags: Vec<RemoteTag>) {
        *self.tags.write().await = tags;
    }

    pub async fn set_series(&self, series: Vec<RemoteSeries>) {
        *self.series.write().await = series;
    }

    pub async fn set_series_tags(&self, series_tags: Vec<RemoteSeriesTag>) {
        *self.series_tags.write().await = series_tags;
    }

    pub async fn set_episodes(&self, episodes: Vec<RemoteEpisode>) {
        *self.episodes.write().await = episodes;
    }

    pub async fn set_releases(&self, releases: Vec<RemoteRelease>) {
        *self.releases.write().await = releases;
    }

    pub async fn set_changed(&self, changed: ChangedSince) {
        *self.changed.write().await = changed;
    }

    /// Queue a failure; each queued failure fails exactly one upcoming call.
    pub async fn push_failure(&self, error: RemoteError) {
        self.failures.write().await.push_back(error);
    }

    /// Queue a failure for one specific operation, leaving other calls
    /// untouched.
    pub async fn push_failure_for(&self, op: &str, error: RemoteError) {
        self.op_failures
            .write()
            .await
            .entry(op.to_string())
            .or_default()
            .push_back(error);
    }

    /// Delay every response by the given duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// All calls recorded so far, in order.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Number of recorded calls for the given operation.
    pub async fn calls_for(&self, op: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| call.op == op)
            .count()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Record the call, apply the configured delay, pop one injected failure.
    async fn begin(&self, op: &str, ids: &[i64]) -> Result<(), RemoteError> {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.write().await.push(RecordedCall {
            op: op.to_string(),
            ids: ids.to_vec(),
        });

        if let Some(queue) = self.op_failures.write().await.get_mut(op) {
            if let Some(error) = queue.pop_front() {
                return Err(error);
            }
        }

        match self.failures.write().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn changed_since(&self, _since: DateTime<Utc>) -> Result<ChangedSince, RemoteError> {
        self.begin("changed_since", &[]).await?;
        Ok(self.changed.read().await.clone())
    }

    async fn all_tags(&self) -> Result<Vec<RemoteTag>, RemoteError> {
        self.begin("all_tags", &[]).await?;
        Ok(self.tags.read().await.clone())
    }

    async fn all_series(&self) -> Result<Vec<RemoteSeries>, RemoteError> {
        self.begin("all_series", &[]).await?;
        Ok(self.series.read().await.clone())
    }

    async fn all_series_tags(&self) -> Result<Vec<RemoteSeriesTag>, RemoteError> {
        self.begin("all_series_tags", &[]).await?;
        Ok(self.series_tags.read().await.clone())
    }

    async fn all_episodes(&self) -> Result<Vec<RemoteEpisode>, RemoteError> {
        self.begin("all_episodes", &[]).await?;
        Ok(self.episodes.read().await.clone())
    }

    async fn all_releases(&self) -> Result<Vec<RemoteRelease>, RemoteError> {
        self.begin("all_releases", &[]).await?;
        Ok(self.releases.read().await.clone())
    }

    async fn tags_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteTag>, RemoteError> {
        self.begin("tags_with_ids", ids).await?;
        Ok(self
            .tags
            .read()
            .await
            .iter()
            .filter(|tag| ids.contains(&tag.id))
            .cloned()
            .collect())
    }

    async fn series_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteSeries>, RemoteError> {
        self.begin("series_with_ids", ids).await?;
        Ok(self
            .series
            .read()
            .await
            .iter()
            .filter(|series| ids.contains(&series.id))
            .cloned()
            .collect())
    }

    async fn series_tags_for_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<RemoteSeriesTag>, RemoteError> {
        self.begin("series_tags_for_ids", ids).await?;
        Ok(self
            .series_tags
            .read()
            .await
            .iter()
            .filter(|st| ids.contains(&st.series))
            .copied()
            .collect())
    }

    async fn episodes_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteEpisode>, RemoteError> {
        self.begin("episodes_with_ids", ids).await?;
        Ok(self
            .episodes
            .read()
            .await
            .iter()
            .filter(|episode| ids.contains(&episode.id))
            .cloned()
            .collect())
    }

    async fn releases_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteRelease>, RemoteError> {
        self.begin("releases_with_ids", ids).await?;
        Ok(self
            .releases
            .read()
            .await
            .iter()
            .filter(|release| ids.contains(&release.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_with_ids_filters_configured_payload() {
        let client = MockCatalogClient::new();
        client
            .set_series(vec![
                fixtures::series(1, "Dark"),
                fixtures::series(2, "The Expanse"),
                fixtures::series(3, "Severance"),
            ])
            .await;

        let result = client.series_with_ids(&[1, 3]).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, 1);
        assert_eq!(result[1].id, 3);
    }

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let client = MockCatalogClient::new();
        client.all_tags().await.unwrap();
        client.series_with_ids(&[5]).await.unwrap();

        let calls = client.recorded_calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].op, "all_tags");
        assert_eq!(calls[1].op, "series_with_ids");
        assert_eq!(calls[1].ids, vec![5]);
    }

    #[tokio::test]
    async fn test_injected_failure_consumed_once() {
        let client = MockCatalogClient::new();
        client.push_failure(RemoteError::Timeout).await;

        assert!(client.all_tags().await.is_err());
        assert!(client.all_tags().await.is_ok());
        assert_eq!(client.call_count().await, 2);
    }
}
