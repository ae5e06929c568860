//! Drives one synchronization run: a full import when the audit log has no
//! prior successful attempt, an incremental update otherwise.
//!
//! Resource kinds are merged in strict dependency order (tags → series →
//! series-tags → episodes → releases); episode rows reference series and
//! release rows reference episodes, so merging out of order would violate
//! foreign keys.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::audit::{SyncLogStore, SyncStatus};
use crate::config::SyncConfig;
use crate::library::{
    EpisodeRecord, LibraryStore, ReleaseRecord, SeriesRecord, SeriesTagRecord, TagKind, TagRecord,
};
use crate::metrics;
use crate::remote::{
    CatalogClient, RemoteEpisode, RemoteRelease, RemoteSeries, RemoteSeriesTag, RemoteTag,
};
use crate::scraper::SwarmScraper;

use super::{fetch_merge, MergeTotals, RequestPolicy, SyncError, SyncEvents};

/// Reconciler knobs, usually derived from [`SyncConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ReconcilerOptions {
    /// Identifiers per fetch page.
    pub request_chunk_size: usize,
    /// Attempts per network call.
    pub retries: u32,
    /// Fixed delay between retry attempts.
    pub retry_delay: Duration,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            request_chunk_size: 450,
            retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl From<&SyncConfig> for ReconcilerOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            request_chunk_size: config.request_chunk_size,
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Outcome of a successful run.
struct RunOutcome {
    totals: MergeTotals,
    /// Service advisory from the updated-since response; empty on full import.
    advisory: String,
    /// Info hashes of the releases merged during this run.
    touched_releases: Vec<String>,
}

/// Reconciles the local replica against the remote catalog.
///
/// The sole writer of catalog rows. Every fatal error is caught at this
/// boundary: the in-flight audit row is concluded and the done event emitted;
/// nothing propagates to the caller.
pub struct Reconciler {
    client: Arc<dyn CatalogClient>,
    library: Arc<dyn LibraryStore>,
    sync_log: Arc<dyn SyncLogStore>,
    scraper: Option<Arc<dyn SwarmScraper>>,
    events: Option<SyncEvents>,
    options: ReconcilerOptions,
}

impl Reconciler {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        library: Arc<dyn LibraryStore>,
        sync_log: Arc<dyn SyncLogStore>,
        options: ReconcilerOptions,
    ) -> Self {
        Self {
            client,
            library,
            sync_log,
            scraper: None,
            events: None,
            options,
        }
    }

    /// Emit progress/done events through the given handle.
    pub fn with_events(mut self, events: SyncEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Invoke the given scraper after every successful run that touched
    /// releases.
    pub fn with_scraper(mut self, scraper: Arc<dyn SwarmScraper>) -> Self {
        self.scraper = Some(scraper);
        self
    }

    /// Execute one run.
    pub async fn run(&self) {
        let last_success = match self.sync_log.last_successful() {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to read sync log: {}", e);
                return;
            }
        };

        let attempt = match self.sync_log.create() {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to record sync attempt: {}", e);
                return;
            }
        };

        let started = Instant::now();
        let result = match last_success {
            Some(since) => self.update_library(since).await,
            None => self.import_library().await,
        };

        match result {
            Ok(outcome) => {
                let elapsed = started.elapsed();
                let description = outcome.totals.describe();
                info!("Finished in {:.1}s: {}", elapsed.as_secs_f64(), description);

                if let Err(e) = self.sync_log.conclude(attempt, SyncStatus::Ok, &description) {
                    error!("Failed to conclude sync attempt: {}", e);
                }

                metrics::SYNC_RUNS.with_label_values(&["ok"]).inc();
                metrics::SYNC_DURATION.observe(elapsed.as_secs_f64());
                record_merged(&outcome.totals);

                if let Some(ref scraper) = self.scraper {
                    if !outcome.touched_releases.is_empty() {
                        if let Err(e) = scraper.scrape(&outcome.touched_releases).await {
                            warn!("Post-sync swarm scrape failed: {}", e);
                        }
                    }
                }

                if let Some(ref events) = self.events {
                    events.done(description, outcome.advisory);
                }
            }
            Err(e) => {
                let description = e.to_string();
                error!("Sync failed: {}", description);

                if let Err(log_err) =
                    self.sync_log
                        .conclude(attempt, SyncStatus::Error, &description)
                {
                    error!("Failed to conclude sync attempt: {}", log_err);
                }

                metrics::SYNC_RUNS.with_label_values(&["error"]).inc();

                if let Some(ref events) = self.events {
                    events.done(description, String::new());
                }
            }
        }
    }

    /// Fetch the complete catalog, one resource kind at a time.
    async fn import_library(&self) -> Result<RunOutcome, SyncError> {
        info!("No previous successful sync found, starting full import");
        let policy = self.policy();
        let instant = Utc::now();
        let mut totals = MergeTotals::default();

        self.progress("First run, importing all tags...");
        let tags = policy.run(|| self.client.all_tags()).await?;
        let rows: Vec<TagRecord> = tags.into_iter().map(tag_record).collect();
        totals.tags = self.library.upsert_tags(&rows)?;

        self.progress("Importing all series...");
        let series = policy.run(|| self.client.all_series()).await?;
        let rows: Vec<SeriesRecord> = series
            .into_iter()
            .map(|remote| series_record(remote, instant))
            .collect();
        totals.series = self.library.upsert_series(&rows)?;

        self.progress("Importing all series tags...");
        let series_tags = policy.run(|| self.client.all_series_tags()).await?;
        let rows: Vec<SeriesTagRecord> =
            series_tags.into_iter().map(series_tag_record).collect();
        self.library.upsert_series_tags(&rows)?;

        self.progress("Importing all episodes...");
        let episodes = policy.run(|| self.client.all_episodes()).await?;
        let rows: Vec<EpisodeRecord> = episodes
            .into_iter()
            .map(|remote| episode_record(remote, instant))
            .collect();
        totals.episodes = self.library.upsert_episodes(&rows)?;

        self.progress("Importing all releases...");
        let releases = policy.run(|| self.client.all_releases()).await?;
        let touched_releases: Vec<String> =
            releases.iter().map(|r| r.info_hash.clone()).collect();
        let rows: Vec<ReleaseRecord> = releases
            .into_iter()
            .map(|remote| release_record(remote, instant))
            .collect();
        totals.releases = self.library.upsert_releases(&rows)?;

        Ok(RunOutcome {
            totals,
            advisory: String::new(),
            touched_releases,
        })
    }

    /// Ask the service what changed since the last successful attempt and
    /// merge only that.
    async fn update_library(&self, since: DateTime<Utc>) -> Result<RunOutcome, SyncError> {
        info!(
            "Last sync done at {} UTC, requesting updates since then",
            since.to_rfc3339()
        );
        self.progress("Checking for updates...");

        let policy = self.policy();
        let changed = policy.run(|| self.client.changed_since(since)).await?;

        let mut totals = MergeTotals::default();
        let mut touched_releases = Vec::new();

        if !changed.tags.is_empty() {
            debug!("Got {} changed tags, starting update", changed.tags.len());
            totals.tags = self.sync_tags(&policy, &changed.tags).await?;
        }

        if !changed.series.is_empty() {
            debug!(
                "Got {} changed series, starting update",
                changed.series.len()
            );
            totals.series = self.sync_series(&policy, &changed.series).await?;
        }

        if !changed.episodes.is_empty() {
            debug!(
                "Got {} changed episodes, starting update",
                changed.episodes.len()
            );
            totals.episodes = self.sync_episodes(&policy, &changed.episodes).await?;
        }

        if !changed.releases.is_empty() {
            debug!(
                "Got {} changed releases, starting update",
                changed.releases.len()
            );
            totals.releases = self
                .sync_releases(&policy, &changed.releases, &mut touched_releases)
                .await?;
        }

        Ok(RunOutcome {
            totals,
            advisory: changed.alert,
            touched_releases,
        })
    }

    async fn sync_tags(&self, policy: &RequestPolicy, ids: &[i64]) -> Result<u32, SyncError> {
        fetch_merge(
            policy,
            ids,
            self.options.request_chunk_size,
            |page| async move { self.client.tags_with_ids(&page).await },
            |records: Vec<RemoteTag>| {
                let rows: Vec<TagRecord> = records.into_iter().map(tag_record).collect();
                self.library.upsert_tags(&rows)
            },
            |remaining| self.progress(format!("Updating {remaining} tags...")),
        )
        .await
    }

    async fn sync_series(&self, policy: &RequestPolicy, ids: &[i64]) -> Result<u32, SyncError> {
        let instant = Utc::now();

        let count = fetch_merge(
            policy,
            ids,
            self.options.request_chunk_size,
            |page| async move { self.client.series_with_ids(&page).await },
            |records: Vec<RemoteSeries>| {
                let rows: Vec<SeriesRecord> = records
                    .into_iter()
                    .map(|remote| series_record(remote, instant))
                    .collect();
                self.library.upsert_series(&rows)
            },
            |remaining| self.progress(format!("Updating {remaining} series...")),
        )
        .await?;

        // Tag membership changes do not bump a series' own timestamp upstream,
        // so associations are refreshed for every changed series id
        fetch_merge(
            policy,
            ids,
            self.options.request_chunk_size,
            |page| async move { self.client.series_tags_for_ids(&page).await },
            |records: Vec<RemoteSeriesTag>| {
                let rows: Vec<SeriesTagRecord> =
                    records.into_iter().map(series_tag_record).collect();
                self.library.upsert_series_tags(&rows)
            },
            |remaining| self.progress(format!("Updating {remaining} series tags...")),
        )
        .await?;

        Ok(count)
    }

    async fn sync_episodes(&self, policy: &RequestPolicy, ids: &[i64]) -> Result<u32, SyncError> {
        let instant = Utc::now();

        fetch_merge(
            policy,
            ids,
            self.options.request_chunk_size,
            |page| async move { self.client.episodes_with_ids(&page).await },
            |records: Vec<RemoteEpisode>| {
                let rows: Vec<EpisodeRecord> = records
                    .into_iter()
                    .map(|remote| episode_record(remote, instant))
                    .collect();
                self.library.upsert_episodes(&rows)
            },
            |remaining| self.progress(format!("Updating {remaining} episodes...")),
        )
        .await
    }

    async fn sync_releases(
        &self,
        policy: &RequestPolicy,
        ids: &[i64],
        touched: &mut Vec<String>,
    ) -> Result<u32, SyncError> {
        let instant = Utc::now();

        fetch_merge(
            policy,
            ids,
            self.options.request_chunk_size,
            |page| async move { self.client.releases_with_ids(&page).await },
            |records: Vec<RemoteRelease>| {
                touched.extend(records.iter().map(|r| r.info_hash.clone()));
                let rows: Vec<ReleaseRecord> = records
                    .into_iter()
                    .map(|remote| release_record(remote, instant))
                    .collect();
                self.library.upsert_releases(&rows)
            },
            |remaining| self.progress(format!("Updating {remaining} releases...")),
        )
        .await
    }

    fn policy(&self) -> RequestPolicy {
        RequestPolicy::new(self.options.retries, self.options.retry_delay)
    }

    fn progress(&self, message: impl Into<String>) {
        if let Some(ref events) = self.events {
            events.progress(message);
        }
    }
}

fn record_merged(totals: &MergeTotals) {
    metrics::RECORDS_MERGED
        .with_label_values(&["tags"])
        .inc_by(totals.tags as u64);
    metrics::RECORDS_MERGED
        .with_label_values(&["series"])
        .inc_by(totals.series as u64);
    metrics::RECORDS_MERGED
        .with_label_values(&["episodes"])
        .inc_by(totals.episodes as u64);
    metrics::RECORDS_MERGED
        .with_label_values(&["releases"])
        .inc_by(totals.releases as u64);
}

fn tag_record(remote: RemoteTag) -> TagRecord {
    TagRecord {
        id: remote.id,
        slug: remote.slug,
        name: remote.name,
        kind: TagKind::from_code(&remote.kind).unwrap_or(TagKind::Genre),
    }
}

fn series_record(remote: RemoteSeries, instant: DateTime<Utc>) -> SeriesRecord {
    SeriesRecord {
        id: remote.id,
        name: remote.name,
        sort_name: remote.sort_name,
        slug: remote.slug,
        overview: remote.overview,
        network: remote.network,
        poster_url: remote.poster_url,
        fanart_url: remote.fanart_url,
        popularity: remote.popularity,
        vote_average: remote.vote_average,
        status: remote.status,
        language: remote.language,
        last_updated_on: instant,
    }
}

fn series_tag_record(remote: RemoteSeriesTag) -> SeriesTagRecord {
    SeriesTagRecord {
        series_id: remote.series,
        tag_id: remote.tag,
    }
}

fn episode_record(remote: RemoteEpisode, instant: DateTime<Utc>) -> EpisodeRecord {
    EpisodeRecord {
        id: 0,
        remote_id: remote.id,
        series_id: remote.series,
        season: remote.season,
        number: remote.number,
        name: remote.name,
        overview: remote.overview,
        aired_on: remote.aired_on,
        thumbnail_url: remote.thumbnail_url,
        last_updated_on: instant,
    }
}

fn release_record(remote: RemoteRelease, instant: DateTime<Utc>) -> ReleaseRecord {
    ReleaseRecord {
        id: 0,
        info_hash: remote.info_hash,
        episode_remote_id: remote.episode,
        name: remote.name,
        size: remote.size,
        magnet_uri: remote.magnet_uri,
        seeders: remote.seeders,
        leechers: remote.leechers,
        completed: remote.completed,
        resolution: remote.resolution,
        added_on: remote.added_on.unwrap_or(instant),
        last_updated_on: instant,
    }
}
