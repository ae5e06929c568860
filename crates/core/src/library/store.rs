use super::{
    EpisodeRecord, LibraryError, LibraryStats, ReleaseRecord, SeriesRecord, SeriesTagRecord,
    TagRecord,
};

/// The local catalog replica.
///
/// All writes are idempotent upserts: conflict on a resource kind's natural
/// key updates that kind's mutable fields only, leaving the local primary key
/// and any locally-only state untouched. Every upsert returns the number of
/// rows inserted or updated.
pub trait LibraryStore: Send + Sync {
    fn upsert_tags(&self, rows: &[TagRecord]) -> Result<u32, LibraryError>;

    fn upsert_series(&self, rows: &[SeriesRecord]) -> Result<u32, LibraryError>;

    fn upsert_series_tags(&self, rows: &[SeriesTagRecord]) -> Result<u32, LibraryError>;

    fn upsert_episodes(&self, rows: &[EpisodeRecord]) -> Result<u32, LibraryError>;

    fn upsert_releases(&self, rows: &[ReleaseRecord]) -> Result<u32, LibraryError>;

    /// Fetch a series by its remote identifier.
    fn get_series(&self, id: i64) -> Result<SeriesRecord, LibraryError>;

    /// Fetch an episode by its natural key.
    fn get_episode(
        &self,
        series_id: i64,
        season: u32,
        number: u32,
    ) -> Result<EpisodeRecord, LibraryError>;

    /// Full-text search over series names.
    fn search_series(&self, query: &str, limit: u32) -> Result<Vec<SeriesRecord>, LibraryError>;

    /// Row counts per resource kind.
    fn stats(&self) -> Result<LibraryStats, LibraryError>;
}
