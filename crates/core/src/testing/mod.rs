//! Testing utilities and mock implementations for lifecycle tests.
//!
//! Provides mock implementations of the external collaborator traits so the
//! engine can be exercised end to end without real infrastructure.

mod mock_catalog_client;
mod mock_scraper;

pub use mock_catalog_client::{MockCatalogClient, RecordedCall};
pub use mock_scraper::MockSwarmScraper;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::remote::{RemoteEpisode, RemoteRelease, RemoteSeries, RemoteSeriesTag, RemoteTag};

    pub fn tag(id: i64, slug: &str) -> RemoteTag {
        RemoteTag {
            id,
            slug: slug.to_string(),
            name: slug.to_string(),
            kind: "G".to_string(),
        }
    }

    pub fn series(id: i64, name: &str) -> RemoteSeries {
        RemoteSeries {
            id,
            name: name.to_string(),
            sort_name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            overview: format!("All about {name}"),
            network: "AMC".to_string(),
            poster_url: String::new(),
            fanart_url: String::new(),
            popularity: 1.0,
            vote_average: 7.0,
            status: "C".to_string(),
            language: "en".to_string(),
        }
    }

    pub fn series_tag(series: i64, tag: i64) -> RemoteSeriesTag {
        RemoteSeriesTag { series, tag }
    }

    pub fn episode(id: i64, series: i64, season: u32, number: u32) -> RemoteEpisode {
        RemoteEpisode {
            id,
            series,
            season,
            number,
            name: format!("Episode {number}"),
            overview: String::new(),
            aired_on: NaiveDate::from_ymd_opt(2024, 6, number % 28 + 1),
            thumbnail_url: String::new(),
        }
    }

    pub fn release(id: i64, info_hash: &str, episode: i64) -> RemoteRelease {
        RemoteRelease {
            id,
            info_hash: info_hash.to_string(),
            episode,
            name: format!("Show.S01.{info_hash}.1080p"),
            size: 1024 * 1024 * 700,
            magnet_uri: format!("magnet:?xt=urn:btih:{info_hash}"),
            seeders: 12,
            leechers: 3,
            completed: 40,
            resolution: 1080,
            added_on: None,
        }
    }
}
