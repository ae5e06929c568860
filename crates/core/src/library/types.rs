//! Types for the local catalog replica.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// A series row. `id` is the remote identifier, which is stable and acts as
/// the natural key for merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Sort key (typically the name with leading articles moved).
    pub sort_name: String,
    pub slug: String,
    pub overview: String,
    pub network: String,
    pub poster_url: String,
    pub fanart_url: String,
    pub popularity: f64,
    pub vote_average: f64,
    /// Single-character status code (running, ended, ...).
    pub status: String,
    /// ISO 639-1 language code.
    pub language: String,
    /// When this row was last touched by a sync run.
    pub last_updated_on: DateTime<Utc>,
}

/// An episode row.
///
/// `id` is the local primary key and never changes. `remote_id` is assigned
/// upstream and is NOT stable for a given episode; merges key on
/// (series_id, season, number) instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Local primary key; 0 for records not yet stored.
    pub id: i64,
    pub remote_id: i64,
    pub series_id: i64,
    pub season: u32,
    pub number: u32,
    pub name: String,
    pub overview: String,
    /// Air date; absent for unscheduled episodes, may be in the future.
    pub aired_on: Option<NaiveDate>,
    pub thumbnail_url: String,
    pub last_updated_on: DateTime<Utc>,
}

/// A release row. `info_hash` is the content-addressed natural key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Local primary key; 0 for records not yet stored.
    pub id: i64,
    /// Info hash (lowercase hex).
    pub info_hash: String,
    /// Remote id of the owning episode.
    pub episode_remote_id: i64,
    pub name: String,
    pub size: u64,
    pub magnet_uri: String,
    pub seeders: u32,
    pub leechers: u32,
    pub completed: u32,
    /// Vertical resolution (0 when unknown).
    pub resolution: u32,
    pub added_on: DateTime<Utc>,
    pub last_updated_on: DateTime<Utc>,
}

/// Tag classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Genre,
    Keyword,
}

impl TagKind {
    /// Single-character storage code.
    pub fn as_code(&self) -> &'static str {
        match self {
            TagKind::Genre => "G",
            TagKind::Keyword => "K",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "G" => Some(TagKind::Genre),
            "K" => Some(TagKind::Keyword),
            _ => None,
        }
    }
}

/// A tag row. `id` is the remote identifier; the slug is human-assigned and
/// can be renamed upstream, so it stays mutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub kind: TagKind,
}

/// A series/tag association. Pure composite key, cascade-deleted with either
/// side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesTagRecord {
    pub series_id: i64,
    pub tag_id: i64,
}

/// Row counts per resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub tags: u64,
    pub series: u64,
    pub series_tags: u64,
    pub episodes: u64,
    pub releases: u64,
}
