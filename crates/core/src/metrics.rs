//! Prometheus metrics for the synchronization engine.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

/// Sync runs total by result.
pub static SYNC_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showbox_sync_runs_total", "Total synchronization runs"),
        &["result"], // "ok", "error"
    )
    .unwrap()
});

/// Records merged per resource kind.
pub static RECORDS_MERGED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "showbox_records_merged_total",
            "Total records merged into the local replica",
        ),
        &["kind"], // "tags", "series", "episodes", "releases"
    )
    .unwrap()
});

/// Sync run duration in seconds.
pub static SYNC_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "showbox_sync_duration_seconds",
            "Duration of synchronization runs",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .unwrap()
});

/// Timed-out catalog requests that were retried.
pub static REMOTE_RETRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "showbox_remote_retries_total",
        "Total catalog request retries after read timeouts",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SYNC_RUNS.clone()),
        Box::new(RECORDS_MERGED.clone()),
        Box::new(SYNC_DURATION.clone()),
        Box::new(REMOTE_RETRIES.clone()),
    ]
}
