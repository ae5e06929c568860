//! Core synchronization engine for the showbox catalog replica.
//!
//! Maintains a local SQLite replica of a remote show catalog (series,
//! episodes, releases, tags) and keeps it fresh with periodic pull-based
//! sync runs: a full import on first run, incremental updates afterwards,
//! with chunked fetches, idempotent upserts and a durable audit log of every
//! attempt.
//!
//! The presentation layers, the BitTorrent transfer engine and the UDP
//! tracker scraper are external collaborators behind the traits in
//! [`remote`] and [`scraper`].

pub mod audit;
pub mod config;
pub mod library;
pub mod metrics;
pub mod remote;
pub mod scheduler;
pub mod scraper;
pub mod sync;
pub mod testing;

pub use audit::{AuditError, SqliteSyncLog, SyncAttempt, SyncLogStore, SyncStatus};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, RemoteConfig,
    SyncConfig,
};
pub use library::{
    EpisodeRecord, LibraryError, LibraryStats, LibraryStore, ReleaseRecord, SeriesRecord,
    SeriesTagRecord, SqliteLibrary, TagKind, TagRecord,
};
pub use remote::{
    CatalogClient, ChangedSince, HttpCatalogClient, RemoteEpisode, RemoteError, RemoteRelease,
    RemoteSeries, RemoteSeriesTag, RemoteTag,
};
pub use scheduler::{SchedulerConfig, SyncScheduler};
pub use scraper::{ScrapeError, SwarmScraper};
pub use sync::{
    sync_event_channel, MergeTotals, Reconciler, ReconcilerOptions, RequestPolicy, SyncError,
    SyncEvent, SyncEvents,
};
