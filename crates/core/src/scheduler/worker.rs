//! Background sync scheduler.
//!
//! A single long-lived task per local store: Idle → Waiting(interval) →
//! Running → (Idle | Stopped). The wait is abortable; a run already in
//! flight completes before shutdown is observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::audit::SyncLogStore;
use crate::sync::Reconciler;

use super::SchedulerConfig;

/// Schedules reconciler runs on a fixed interval.
///
/// Only one scheduler may be active for a given store; `start` enforces that
/// on the handle itself. Manual triggers are ignored while a run is active —
/// no queueing, no overlap.
pub struct SyncScheduler {
    config: SchedulerConfig,
    reconciler: Arc<Reconciler>,
    sync_log: Arc<dyn SyncLogStore>,
    running: Arc<AtomicBool>,
    sync_active: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    wakeup: Arc<Notify>,
}

impl SyncScheduler {
    pub fn new(
        config: SchedulerConfig,
        reconciler: Arc<Reconciler>,
        sync_log: Arc<dyn SyncLogStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            reconciler,
            sync_log,
            running: Arc::new(AtomicBool::new(false)),
            sync_active: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            wakeup: Arc::new(Notify::new()),
        }
    }

    /// Start the background task. The first run fires immediately; every
    /// later run waits [`SchedulerConfig::sync_interval`] regardless of the
    /// previous outcome.
    ///
    /// Returns `None` when the scheduler is already running. Callers needing
    /// bounded shutdown latency should join the returned handle under an
    /// external timeout.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync scheduler already running");
            return None;
        }

        let config = self.config;
        let reconciler = Arc::clone(&self.reconciler);
        let sync_log = Arc::clone(&self.sync_log);
        let running = Arc::clone(&self.running);
        let sync_active = Arc::clone(&self.sync_active);
        let wakeup = Arc::clone(&self.wakeup);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        Some(tokio::spawn(async move {
            info!("Sync scheduler started");

            let mut wait = Duration::ZERO;
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(wait) => {},
                    _ = wakeup.notified() => {},
                }
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                wait = config.sync_interval;

                // Minimum re-sync floor: a gated run is skipped outright,
                // with no audit row and no network calls
                if let Some(last) = last_successful(&sync_log) {
                    let elapsed = Utc::now().signed_duration_since(last);
                    let floor = chrono::Duration::from_std(config.min_sync_interval)
                        .unwrap_or_else(|_| chrono::Duration::zero());
                    if elapsed < floor {
                        info!(
                            "Last successful sync finished {}m ago, skipping",
                            elapsed.num_minutes()
                        );
                        continue;
                    }
                }

                sync_active.store(true, Ordering::SeqCst);
                reconciler.run().await;
                sync_active.store(false, Ordering::SeqCst);
            }

            info!("Sync scheduler stopped");
        }))
    }

    /// Request shutdown. The wait between runs is interrupted immediately; a
    /// run already in flight completes or times out normally first.
    pub fn abort(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Sync scheduler not running");
            return;
        }
        info!("Stopping sync scheduler");
        let _ = self.shutdown_tx.send(());
    }

    /// Ask for a run now. Ignored while a run is active; a granted trigger is
    /// still subject to the minimum re-sync floor.
    pub fn trigger(&self) {
        if !self.running.load(Ordering::SeqCst) {
            warn!("Sync scheduler not running, trigger ignored");
            return;
        }
        if self.sync_active.load(Ordering::SeqCst) {
            warn!("Sync is already running, request ignored");
            return;
        }
        self.wakeup.notify_one();
    }

    /// Whether the scheduler task is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a reconciler run is in flight right now.
    pub fn is_sync_active(&self) -> bool {
        self.sync_active.load(Ordering::SeqCst)
    }
}

fn last_successful(sync_log: &Arc<dyn SyncLogStore>) -> Option<DateTime<Utc>> {
    match sync_log.last_successful() {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to read sync log: {}", e);
            None
        }
    }
}
