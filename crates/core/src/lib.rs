pub mod config;
pub mod manager;
pub mod matching;
pub mod orchestrator;
pub mod provider;
pub mod testing;
pub mod tracker;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ManagerConfig,
    ProviderConfig, SanitizedConfig,
};
pub use manager::{HttpMediaManager, Item, ItemKind, LanguageSpec, ManagerError, MediaManager};
pub use matching::{
    extract_episode_tag, EpisodeTag, MatchResult, PatternGenerator, PatternKind, ResultMatcher,
    SearchPattern,
};
pub use orchestrator::{
    AcquisitionOrchestrator, CallGate, LanguageOutcome, OrchestratorConfig, OrchestratorError,
    RunSummary,
};
pub use provider::{
    Candidate, HttpSubtitleProvider, ProviderError, SubtitleProvider, SubtitleQuery,
};
pub use tracker::{eligible, SearchOutcome, Tracker, TrackerError, TrackingEntry};
