use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    ChangedSince, RemoteEpisode, RemoteError, RemoteRelease, RemoteSeries, RemoteSeriesTag,
    RemoteTag,
};

/// Stateless request surface of the remote catalog service.
///
/// One call per resource kind, in `all` and `with-ids` variants, plus the
/// updated-since diff. Implementations build and issue single requests; retry
/// policy lives with the caller.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Identifiers changed after `since`, plus any service advisory.
    async fn changed_since(&self, since: DateTime<Utc>) -> Result<ChangedSince, RemoteError>;

    async fn all_tags(&self) -> Result<Vec<RemoteTag>, RemoteError>;

    async fn all_series(&self) -> Result<Vec<RemoteSeries>, RemoteError>;

    async fn all_series_tags(&self) -> Result<Vec<RemoteSeriesTag>, RemoteError>;

    async fn all_episodes(&self) -> Result<Vec<RemoteEpisode>, RemoteError>;

    async fn all_releases(&self) -> Result<Vec<RemoteRelease>, RemoteError>;

    async fn tags_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteTag>, RemoteError>;

    async fn series_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteSeries>, RemoteError>;

    /// All tag associations for the given series ids.
    async fn series_tags_for_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<RemoteSeriesTag>, RemoteError>;

    async fn episodes_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteEpisode>, RemoteError>;

    async fn releases_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteRelease>, RemoteError>;
}
