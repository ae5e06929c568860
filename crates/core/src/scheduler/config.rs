use std::time::Duration;

use crate::config::SyncConfig;

/// Timing knobs for the background sync task.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Pause between runs. The first run fires immediately.
    pub sync_interval: Duration,
    /// Runs are skipped while the last successful attempt is younger than
    /// this; protects the remote service from repeated manual triggers.
    pub min_sync_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(60 * 60 * 2),
            min_sync_interval: Duration::from_secs(60 * 15),
        }
    }
}

impl From<&SyncConfig> for SchedulerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            sync_interval: Duration::from_secs(config.interval_secs),
            min_sync_interval: Duration::from_secs(config.min_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.sync_interval, Duration::from_secs(7200));
        assert_eq!(config.min_sync_interval, Duration::from_secs(900));
    }

    #[test]
    fn test_from_sync_config() {
        let sync = SyncConfig {
            interval_secs: 60,
            min_interval_secs: 10,
            ..SyncConfig::default()
        };
        let config = SchedulerConfig::from(&sync);
        assert_eq!(config.sync_interval, Duration::from_secs(60));
        assert_eq!(config.min_sync_interval, Duration::from_secs(10));
    }
}
