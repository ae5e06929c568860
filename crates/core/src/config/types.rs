//! Configuration types for the synchronization engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote catalog service settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Synchronization scheduling and merge settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Remote catalog service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the catalog service API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Opaque client identifier sent with every request.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            client_id: default_client_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Synchronization scheduling and merge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Pause between scheduled sync runs, in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Runs are skipped while the last successful attempt is younger than
    /// this, in seconds.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
    /// Identifiers per fetch page. The serialized request URI must stay
    /// under common URL-length limits.
    #[serde(default = "default_request_chunk_size")]
    pub request_chunk_size: usize,
    /// Attempts per network call before a timeout becomes fatal.
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Fixed delay between retry attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            min_interval_secs: default_min_interval_secs(),
            request_chunk_size: default_request_chunk_size(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "https://showbox.passiomatic.com/1".to_string()
}

fn default_client_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    60 * 60 * 2
}

fn default_min_interval_secs() -> u64 {
    60 * 15
}

fn default_request_chunk_size() -> usize {
    450
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sync.interval_secs, 7200);
        assert_eq!(config.sync.min_interval_secs, 900);
        assert_eq!(config.sync.request_chunk_size, 450);
        assert_eq!(config.sync.retries, 3);
        assert_eq!(config.sync.retry_delay_ms, 5000);
        assert_eq!(config.remote.timeout_secs, 10);
        assert!(!config.remote.endpoint.is_empty());
    }

    #[test]
    fn test_default_client_id_is_generated() {
        let a = Config::default();
        let b = Config::default();
        assert_eq!(a.remote.client_id.len(), 32);
        assert_ne!(a.remote.client_id, b.remote.client_id);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let json = r#"{"sync": {"interval_secs": 60}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.sync.interval_secs, 60);
        assert_eq!(config.sync.request_chunk_size, 450);
        assert_eq!(config.remote.timeout_secs, 10);
    }
}
