//! Shared helpers for lifecycle tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use showbox_core::testing::{fixtures, MockCatalogClient};
use showbox_core::{
    CatalogClient, LibraryStore, Reconciler, ReconcilerOptions, SqliteLibrary, SqliteSyncLog,
    SyncLogStore,
};

/// In-memory stores plus a mock remote, wired the way the composition root
/// would wire the real thing.
pub struct Harness {
    pub client: Arc<MockCatalogClient>,
    pub library: Arc<SqliteLibrary>,
    pub sync_log: Arc<SqliteSyncLog>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            client: Arc::new(MockCatalogClient::new()),
            library: Arc::new(SqliteLibrary::in_memory().unwrap()),
            sync_log: Arc::new(SqliteSyncLog::in_memory().unwrap()),
        }
    }

    /// Fast retry knobs so timeout tests do not sleep for real.
    pub fn options() -> ReconcilerOptions {
        ReconcilerOptions {
            request_chunk_size: 450,
            retries: 3,
            retry_delay: Duration::from_millis(1),
        }
    }

    pub fn reconciler(&self) -> Reconciler {
        self.reconciler_with_options(Self::options())
    }

    pub fn reconciler_with_options(&self, options: ReconcilerOptions) -> Reconciler {
        Reconciler::new(
            Arc::clone(&self.client) as Arc<dyn CatalogClient>,
            Arc::clone(&self.library) as Arc<dyn LibraryStore>,
            Arc::clone(&self.sync_log) as Arc<dyn SyncLogStore>,
            options,
        )
    }

    /// Seed the remote with a small complete catalog: 5 tags, 3 series,
    /// 10 episodes, 25 releases.
    pub async fn seed_catalog(&self) {
        self.client
            .set_tags((1..=5).map(|id| fixtures::tag(id, &format!("tag-{id}"))).collect())
            .await;

        self.client
            .set_series(vec![
                fixtures::series(1, "Dark"),
                fixtures::series(2, "The Expanse"),
                fixtures::series(3, "Severance"),
            ])
            .await;

        self.client
            .set_series_tags(vec![
                fixtures::series_tag(1, 1),
                fixtures::series_tag(1, 2),
                fixtures::series_tag(2, 3),
                fixtures::series_tag(3, 4),
                fixtures::series_tag(3, 5),
            ])
            .await;

        // 10 episodes: ids 101..=110, spread over the 3 series
        let episodes = (0..10)
            .map(|i| {
                let series = (i % 3) + 1;
                let number = (i / 3) + 1;
                fixtures::episode(101 + i, series, 1, number as u32)
            })
            .collect();
        self.client.set_episodes(episodes).await;

        // 25 releases: ids 1001..=1025, spread over the 10 episodes
        let releases = (0..25)
            .map(|i| {
                let episode = 101 + (i % 10);
                fixtures::release(1001 + i, &format!("hash{i:03}"), episode)
            })
            .collect();
        self.client.set_releases(releases).await;
    }
}

/// Poll until `predicate` yields true, failing the test after `timeout`.
pub async fn wait_until<F>(timeout: Duration, mut predicate: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !predicate() {
        if tokio::time::Instant::now() >= deadline {
            panic!("Condition not met within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
