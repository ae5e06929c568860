use super::{Config, ConfigError};

/// Check a loaded configuration for values the engine cannot work with.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.remote.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "remote.endpoint must not be empty".to_string(),
        ));
    }

    if !config.remote.endpoint.starts_with("http://")
        && !config.remote.endpoint.starts_with("https://")
    {
        return Err(ConfigError::Invalid(format!(
            "remote.endpoint must be an http(s) URL, got '{}'",
            config.remote.endpoint
        )));
    }

    if config.remote.client_id.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "remote.client_id must not be empty".to_string(),
        ));
    }

    if config.remote.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "remote.timeout_secs must be greater than zero".to_string(),
        ));
    }

    if config.sync.request_chunk_size == 0 {
        return Err(ConfigError::Invalid(
            "sync.request_chunk_size must be greater than zero".to_string(),
        ));
    }

    if config.sync.retries == 0 {
        return Err(ConfigError::Invalid(
            "sync.retries must be greater than zero".to_string(),
        ));
    }

    if config.sync.min_interval_secs > config.sync.interval_secs {
        return Err(ConfigError::Invalid(
            "sync.min_interval_secs must not exceed sync.interval_secs".to_string(),
        ));
    }

    Ok(())
}
