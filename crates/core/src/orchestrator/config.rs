//! Orchestrator configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::matching::PatternKind;

/// Runtime settings for one acquisition run, derived from [`Config`].
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Scratch directory for downloaded archives and extracted files.
    pub download_dir: PathBuf,
    pub movies_enabled: bool,
    pub episodes_enabled: bool,
    /// Episode pattern kinds in try order.
    pub episode_patterns: Vec<PatternKind>,
    /// Language codes to attempt (empty = all the manager reports).
    pub language_filter: Vec<String>,
    /// Minimum delay between consecutive search API calls.
    pub min_call_delay: Duration,
    /// Extra delay after a rate-limit response.
    pub rate_limit_backoff: Duration,
    /// Retry interval when the manager does not report one, in hours.
    pub fallback_interval_hours: u32,
}

impl OrchestratorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            download_dir: config.download.directory.clone(),
            movies_enabled: config.movies.enabled,
            episodes_enabled: config.episodes.enabled,
            episode_patterns: config.episodes.patterns.clone(),
            language_filter: config.languages.only.clone(),
            min_call_delay: Duration::from_secs(config.throttle.min_delay_secs),
            rate_limit_backoff: Duration::from_secs(config.throttle.backoff_secs),
            fallback_interval_hours: config.tracking.fallback_interval_hours,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            movies_enabled: true,
            episodes_enabled: true,
            episode_patterns: vec![
                PatternKind::SeasonEpisode,
                PatternKind::EpisodeTitle,
                PatternKind::SceneName,
            ],
            language_filter: Vec::new(),
            min_call_delay: Duration::from_secs(2),
            rate_limit_backoff: Duration::from_secs(10),
            fallback_interval_hours: 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert!(config.movies_enabled);
        assert!(config.episodes_enabled);
        assert_eq!(config.min_call_delay, Duration::from_secs(2));
        assert_eq!(config.fallback_interval_hours, 24);
        assert!(config.language_filter.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = load_config_from_str(
            r#"
[manager]
url = "http://localhost:6767"
api_key = "key"

[provider]
url = "https://subs.example.com/api"

[download]
directory = "/tmp/subs"

[movies]
enabled = false

[episodes]
patterns = ["scene_name"]

[languages]
only = ["en"]

[throttle]
min_delay_secs = 7
backoff_secs = 21

[tracking]
fallback_interval_hours = 6
"#,
        )
        .unwrap();

        let orchestrator = OrchestratorConfig::from_config(&config);
        assert!(!orchestrator.movies_enabled);
        assert_eq!(orchestrator.episode_patterns, vec![PatternKind::SceneName]);
        assert_eq!(orchestrator.language_filter, vec!["en"]);
        assert_eq!(orchestrator.min_call_delay, Duration::from_secs(7));
        assert_eq!(orchestrator.rate_limit_backoff, Duration::from_secs(21));
        assert_eq!(orchestrator.fallback_interval_hours, 6);
        assert_eq!(orchestrator.download_dir, PathBuf::from("/tmp/subs"));
    }
}
