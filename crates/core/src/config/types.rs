use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::matching::PatternKind;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub manager: ManagerConfig,
    pub provider: ProviderConfig,
    pub download: DownloadConfig,
    #[serde(default)]
    pub movies: MoviesConfig,
    #[serde(default)]
    pub episodes: EpisodesConfig,
    #[serde(default)]
    pub languages: LanguagesConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Media-management API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManagerConfig {
    /// Base URL (e.g. "http://localhost:6767")
    pub url: String,
    /// API key sent in the X-API-KEY header
    pub api_key: String,
    /// Basic auth credentials, only for reverse-proxy deployments
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Subtitle-search API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Base URL of the search API
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Scratch download directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    pub directory: PathBuf,
}

/// Movie processing toggle
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoviesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MoviesConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Episode processing toggle and pattern order
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EpisodesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Episode search patterns in try order
    #[serde(default = "default_patterns")]
    pub patterns: Vec<PatternKind>,
}

impl Default for EpisodesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: default_patterns(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_patterns() -> Vec<PatternKind> {
    vec![
        PatternKind::SeasonEpisode,
        PatternKind::EpisodeTitle,
        PatternKind::SceneName,
    ]
}

/// Language restriction
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LanguagesConfig {
    /// Only attempt these language codes (empty = all languages the manager
    /// reports as missing)
    #[serde(default)]
    pub only: Vec<String>,
}

/// Search API throttling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Minimum delay between consecutive search API calls, in seconds
    #[serde(default = "default_min_delay")]
    pub min_delay_secs: u64,
    /// Extra delay applied after a rate-limit response, in seconds
    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay(),
            backoff_secs: default_backoff(),
        }
    }
}

fn default_min_delay() -> u64 {
    2
}

fn default_backoff() -> u64 {
    10
}

/// Tracker store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackingConfig {
    /// Tracker store file path
    #[serde(default = "default_tracking_path")]
    pub path: PathBuf,
    /// Retry interval used when the manager does not report one, in hours
    #[serde(default = "default_fallback_interval")]
    pub fallback_interval_hours: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            path: default_tracking_path(),
            fallback_interval_hours: default_fallback_interval(),
        }
    }
}

fn default_tracking_path() -> PathBuf {
    PathBuf::from("tracking.json")
}

fn default_fallback_interval() -> u32 {
    24
}

/// Sanitized config for startup logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub manager: SanitizedManagerConfig,
    pub provider: ProviderConfig,
    pub download: DownloadConfig,
    pub movies: MoviesConfig,
    pub episodes: EpisodesConfig,
    pub languages: LanguagesConfig,
    pub throttle: ThrottleConfig,
    pub tracking: TrackingConfig,
}

/// Sanitized manager config (API key and password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedManagerConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub basic_auth_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            manager: SanitizedManagerConfig {
                url: config.manager.url.clone(),
                api_key_configured: !config.manager.api_key.is_empty(),
                basic_auth_configured: config
                    .manager
                    .username
                    .as_ref()
                    .is_some_and(|u| !u.is_empty()),
                timeout_secs: config.manager.timeout_secs,
            },
            provider: config.provider.clone(),
            download: config.download.clone(),
            movies: config.movies.clone(),
            episodes: config.episodes.clone(),
            languages: config.languages.clone(),
            throttle: config.throttle.clone(),
            tracking: config.tracking.clone(),
        }
    }
}
