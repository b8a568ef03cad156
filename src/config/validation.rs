use crate::config::types::{Config, MarkerConfig, SourceConfig, StorageConfig, SyncConfig};
use crate::ConfigError;
use url::Url;

/// Longest allowed pause between passes: one week
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_marker_config(&config.markers)?;
    validate_sync_config(&config.sync)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates the site and session settings
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.continue_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "continue-path cannot be empty".to_string(),
        ));
    }

    validate_cookie_value("user-id", &config.user_id)?;
    validate_cookie_value("password-hash", &config.password_hash)?;

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Session cookie values end up in a `Cookie` header verbatim
fn validate_cookie_value(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if value
        .chars()
        .any(|c| c.is_whitespace() || c == ';' || c == ',' || c.is_control())
    {
        return Err(ConfigError::Validation(format!(
            "{} contains characters not allowed in a cookie value",
            name
        )));
    }

    Ok(())
}

/// Validates classification markers
fn validate_marker_config(config: &MarkerConfig) -> Result<(), ConfigError> {
    if config.new_episode.iter().all(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "markers.new-episode needs at least one non-empty keyword".to_string(),
        ));
    }

    if config.more_episodes.iter().any(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "markers.more-episodes cannot contain empty keywords".to_string(),
        ));
    }

    if config.watched_class.trim().is_empty() || config.watched_class.contains(' ') {
        return Err(ConfigError::Validation(format!(
            "markers.watched-class must be a single class name, got '{}'",
            config.watched_class
        )));
    }

    if config.not_logged_in.trim().is_empty() {
        return Err(ConfigError::Validation(
            "markers.not-logged-in cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates pass timing and retry settings
fn validate_sync_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.interval_minutes < 1 || config.interval_minutes > MAX_INTERVAL_MINUTES {
        return Err(ConfigError::Validation(format!(
            "interval-minutes must be between 1 and {}, got {}",
            MAX_INTERVAL_MINUTES, config.interval_minutes
        )));
    }

    if config.detail_retries > 20 {
        return Err(ConfigError::Validation(format!(
            "detail-retries must be <= 20, got {}",
            config.detail_retries
        )));
    }

    if config.detail_retry_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "detail-retry-delay-ms must be <= 60000ms, got {}ms",
            config.detail_retry_delay_ms
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
