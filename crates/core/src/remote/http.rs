//! HTTP/JSON client for the remote catalog service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::RemoteConfig;

use super::{
    CatalogClient, ChangedSince, RemoteEpisode, RemoteError, RemoteRelease, RemoteSeries,
    RemoteSeriesTag, RemoteTag,
};

/// Descriptive client/version string sent with every request.
const USER_AGENT: &str = concat!(
    "Showbox/",
    env!("CARGO_PKG_VERSION"),
    " <https://github.com/passiomatic/showbox>"
);

/// Catalog client over HTTP. Pure request/response; no retries.
pub struct HttpCatalogClient {
    client: Client,
    endpoint: String,
    client_id: String,
}

impl HttpCatalogClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!("Querying catalog endpoint {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("client", self.client_id.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout
                } else {
                    RemoteError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout
            } else {
                RemoteError::Parse(e.to_string())
            }
        })
    }

    fn make_ids(ids: &[i64]) -> String {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn changed_since(&self, since: DateTime<Utc>) -> Result<ChangedSince, RemoteError> {
        self.get_json("updated", &[("since", since.to_rfc3339())])
            .await
    }

    async fn all_tags(&self) -> Result<Vec<RemoteTag>, RemoteError> {
        self.get_json("tags/all", &[]).await
    }

    async fn all_series(&self) -> Result<Vec<RemoteSeries>, RemoteError> {
        self.get_json("series/all", &[]).await
    }

    async fn all_series_tags(&self) -> Result<Vec<RemoteSeriesTag>, RemoteError> {
        self.get_json("series-tags/all", &[]).await
    }

    async fn all_episodes(&self) -> Result<Vec<RemoteEpisode>, RemoteError> {
        self.get_json("episodes/all", &[]).await
    }

    async fn all_releases(&self) -> Result<Vec<RemoteRelease>, RemoteError> {
        self.get_json("releases/all", &[]).await
    }

    async fn tags_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteTag>, RemoteError> {
        self.get_json("tags", &[("ids", Self::make_ids(ids))]).await
    }

    async fn series_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteSeries>, RemoteError> {
        self.get_json("series", &[("ids", Self::make_ids(ids))])
            .await
    }

    async fn series_tags_for_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<RemoteSeriesTag>, RemoteError> {
        self.get_json("series-tags", &[("ids", Self::make_ids(ids))])
            .await
    }

    async fn episodes_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteEpisode>, RemoteError> {
        self.get_json("episodes", &[("ids", Self::make_ids(ids))])
            .await
    }

    async fn releases_with_ids(&self, ids: &[i64]) -> Result<Vec<RemoteRelease>, RemoteError> {
        self.get_json("releases", &[("ids", Self::make_ids(ids))])
            .await
    }
}
