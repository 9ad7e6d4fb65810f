use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Required sections exist (enforced by serde)
/// - URLs are non-empty
/// - Download directory is non-empty
/// - Episode patterns are non-empty when episodes are enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.manager.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "manager.url cannot be empty".to_string(),
        ));
    }

    if config.provider.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "provider.url cannot be empty".to_string(),
        ));
    }

    if config.download.directory.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "download.directory cannot be empty".to_string(),
        ));
    }

    if config.episodes.enabled && config.episodes.patterns.is_empty() {
        return Err(ConfigError::ValidationError(
            "episodes.patterns cannot be empty when episodes are enabled".to_string(),
        ));
    }

    Ok(())
}
