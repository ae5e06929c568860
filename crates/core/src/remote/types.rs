//! Wire types for the remote catalog service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for remote catalog calls.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Read timeout; the caller may retry.
    #[error("server timed out while handling the request")]
    Timeout,

    /// Non-2xx HTTP status; never retried.
    #[error("server error {status} occurred while handling the request")]
    Status { status: u16 },

    /// Transport failure other than a timeout (DNS, refused connection, ...).
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse server response: {0}")]
    Parse(String),
}

/// A tag as served by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTag {
    pub id: i64,
    pub slug: String,
    pub name: String,
    /// Single-character kind code ("G" genre, "K" keyword).
    #[serde(default)]
    pub kind: String,
}

/// A series as served by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSeries {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sort_name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub fanart_url: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub language: String,
}

/// A series/tag association as served by the catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RemoteSeriesTag {
    pub series: i64,
    pub tag: i64,
}

/// An episode as served by the catalog. The id may be reassigned upstream
/// for a given (series, season, number).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEpisode {
    pub id: i64,
    /// Remote id of the owning series.
    pub series: i64,
    pub season: u32,
    pub number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub aired_on: Option<NaiveDate>,
    #[serde(default)]
    pub thumbnail_url: String,
}

/// A release as served by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRelease {
    pub id: i64,
    /// Info hash (hex), the content-addressed identifier and merge key.
    pub info_hash: String,
    /// Remote id of the owning episode.
    pub episode: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub magnet_uri: String,
    #[serde(default)]
    pub seeders: u32,
    #[serde(default)]
    pub leechers: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub resolution: u32,
    #[serde(default)]
    pub added_on: Option<DateTime<Utc>>,
}

/// Response of the updated-since call: a service advisory (possibly empty)
/// plus the identifiers changed after the given instant, one list per
/// resource kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangedSince {
    /// Advisory message to surface verbatim to the user; empty when absent.
    #[serde(default)]
    pub alert: String,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub series: Vec<i64>,
    #[serde(default)]
    pub episodes: Vec<i64>,
    #[serde(default)]
    pub releases: Vec<i64>,
}

impl ChangedSince {
    /// True when no resource kind changed.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.series.is_empty()
            && self.episodes.is_empty()
            && self.releases.is_empty()
    }
}
