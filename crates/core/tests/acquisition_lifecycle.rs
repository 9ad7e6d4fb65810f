//! Acquisition lifecycle integration tests.
//!
//! These drive the orchestrator end to end through mock collaborators:
//! eligibility → pattern search → match → download → upload → tracker write.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;

use subfetch_core::testing::{fixtures, MockMediaManager, MockSubtitleProvider};
use subfetch_core::{
    AcquisitionOrchestrator, ItemKind, LanguageSpec, ManagerError, OrchestratorConfig,
    OrchestratorError, ProviderError, SearchOutcome, Tracker,
};

/// Test helper bundling the mocks and scratch space for one orchestrator.
struct TestHarness {
    manager: Arc<MockMediaManager>,
    provider: Arc<MockSubtitleProvider>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            manager: Arc::new(MockMediaManager::new()),
            provider: Arc::new(MockSubtitleProvider::new()),
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn tracker_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("tracking.json")
    }

    fn download_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("downloads")
    }

    fn create_orchestrator(&self) -> AcquisitionOrchestrator {
        let config = OrchestratorConfig {
            download_dir: self.download_dir(),
            min_call_delay: Duration::from_secs(2),
            rate_limit_backoff: Duration::from_secs(10),
            ..Default::default()
        };
        let tracker = Tracker::load(self.tracker_path());

        AcquisitionOrchestrator::new(
            config,
            Arc::clone(&self.manager) as Arc<dyn subfetch_core::MediaManager>,
            Arc::clone(&self.provider) as Arc<dyn subfetch_core::SubtitleProvider>,
            tracker,
        )
    }
}

#[tokio::test(start_paused = true)]
async fn test_movie_never_searched_is_acquired() {
    let harness = TestHarness::new();
    harness
        .manager
        .set_wanted_movies(vec![fixtures::movie_item("m1", "Nomad", Some(2021))])
        .await;
    harness
        .provider
        .set_results(vec![fixtures::candidate("Nomad.2021.1080p.WEB", "r1")])
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.items_processed, 1);
    assert_eq!(summary.acquired, 1);
    assert_eq!(summary.skipped, 0);

    // Exactly one pattern for a movie, so exactly one search.
    let searches = harness.provider.recorded_searches().await;
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].query.query, "Nomad 2021");

    // Uploaded to the manager.
    let uploads = harness.manager.recorded_uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].item_id, "m1");
    assert_eq!(uploads[0].language.code, "en");

    // Tracker records the success with the language satisfied.
    let entry = orchestrator.tracker().get(ItemKind::Movie, "m1").unwrap();
    assert_eq!(entry.last_result, SearchOutcome::Found);
    assert!(entry.is_satisfied("en"));
}

#[tokio::test(start_paused = true)]
async fn test_recently_failed_episode_is_skipped() {
    let harness = TestHarness::new();
    harness
        .manager
        .set_wanted_episodes(vec![fixtures::episode_item("e7", "Show Name", 1, 3)])
        .await;

    // A failed attempt well within the 24h interval.
    {
        let mut tracker = Tracker::load(harness.tracker_path());
        tracker
            .record(ItemKind::Episode, "e7", SearchOutcome::NotFound, &[], Utc::now())
            .unwrap();
    }

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.items_processed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.acquired, 0);

    // No network calls at all for a skipped item.
    assert_eq!(harness.provider.search_count().await, 0);
    assert_eq!(harness.manager.upload_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_first_pattern_match_short_circuits() {
    let harness = TestHarness::new();
    let mut episode = fixtures::episode_item("e1", "Show Name", 1, 2);
    episode.episode_title = Some("The Heist".to_string());
    episode.scene_name = Some("Show.Name.S01E02.720p.HDTV-GRP".to_string());
    harness.manager.set_wanted_episodes(vec![episode]).await;

    harness
        .provider
        .set_results(vec![fixtures::candidate("Show.Name.S01E02.HDTV", "r1")])
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.acquired, 1);
    // The season_episode pattern matched; episode_title and scene_name
    // searches were never issued.
    assert_eq!(harness.provider.search_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_falls_back_to_next_pattern() {
    let harness = TestHarness::new();
    let mut episode = fixtures::episode_item("e1", "Show Name", 1, 2);
    episode.episode_title = Some("The Heist".to_string());
    harness.manager.set_wanted_episodes(vec![episode]).await;

    // Nothing for the S01E02 query; a match only via the episode title.
    harness
        .provider
        .set_query_handler(|q| {
            if q.query.contains("Heist") {
                Some(vec![fixtures::candidate("Show.Name.S01E02.WEB", "r2")])
            } else {
                Some(vec![])
            }
        })
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.acquired, 1);
    let searches = harness.provider.recorded_searches().await;
    assert_eq!(searches.len(), 2);
    assert_eq!(searches[0].query.query, "Show Name S01E02");
    assert_eq!(searches[1].query.query, "Show Name The Heist");
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_patterns_record_not_found() {
    let harness = TestHarness::new();
    let mut episode = fixtures::episode_item("e1", "Show Name", 1, 2);
    episode.episode_title = Some("The Heist".to_string());
    episode.scene_name = Some("Show.Name.S01E02.720p.HDTV-GRP".to_string());
    harness.manager.set_wanted_episodes(vec![episode]).await;

    // Candidates exist but none carry a matching episode tag.
    harness
        .provider
        .set_results(vec![fixtures::candidate("Show.Name.S01E05.HDTV", "r1")])
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.not_found, 1);
    // All three patterns were tried.
    assert_eq!(harness.provider.search_count().await, 3);

    let entry = orchestrator.tracker().get(ItemKind::Episode, "e1").unwrap();
    assert_eq!(entry.last_result, SearchOutcome::NotFound);
    assert!(!entry.is_satisfied("en"));
}

#[tokio::test(start_paused = true)]
async fn test_searches_respect_minimum_delay() {
    let harness = TestHarness::new();
    let mut episode = fixtures::episode_item("e1", "Show Name", 1, 2);
    episode.episode_title = Some("The Heist".to_string());
    episode.scene_name = Some("Show.Name.S01E02.720p.HDTV-GRP".to_string());
    harness.manager.set_wanted_episodes(vec![episode]).await;
    harness.provider.set_results(vec![]).await;

    let mut orchestrator = harness.create_orchestrator();
    orchestrator.run().await.unwrap();

    let searches = harness.provider.recorded_searches().await;
    assert_eq!(searches.len(), 3);
    for pair in searches.windows(2) {
        let gap = pair[1].timestamp - pair[0].timestamp;
        assert!(
            gap >= Duration::from_secs(2),
            "searches spaced {:?}, expected at least 2s",
            gap
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_backs_off_then_retries() {
    let harness = TestHarness::new();
    harness
        .manager
        .set_wanted_movies(vec![fixtures::movie_item("m1", "Nomad", Some(2021))])
        .await;
    harness
        .provider
        .push_search_error(ProviderError::RateLimited { retry_after: None })
        .await;
    harness
        .provider
        .set_results(vec![fixtures::candidate("Nomad.2021.1080p.WEB", "r1")])
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    // The retry succeeded.
    assert_eq!(summary.acquired, 1);

    let searches = harness.provider.recorded_searches().await;
    assert_eq!(searches.len(), 2);
    // The retry waited for the backoff on top of the normal floor.
    let gap = searches[1].timestamp - searches[0].timestamp;
    assert!(
        gap >= Duration::from_secs(12),
        "retry after {:?}, expected at least 12s",
        gap
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_rate_limit_abandons_item() {
    let harness = TestHarness::new();
    harness
        .manager
        .set_wanted_movies(vec![fixtures::movie_item("m1", "Nomad", Some(2021))])
        .await;
    harness
        .provider
        .push_search_error(ProviderError::RateLimited { retry_after: None })
        .await;
    harness
        .provider
        .push_search_error(ProviderError::RateLimited { retry_after: None })
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(harness.provider.search_count().await, 2);

    let entry = orchestrator.tracker().get(ItemKind::Movie, "m1").unwrap();
    assert_eq!(entry.last_result, SearchOutcome::Error);
}

#[tokio::test(start_paused = true)]
async fn test_auth_rejection_aborts_run() {
    let harness = TestHarness::new();
    harness
        .manager
        .set_wanted_movies(vec![fixtures::movie_item("m1", "Nomad", Some(2021))])
        .await;
    harness.manager.push_error(ManagerError::Unauthorized).await;

    let mut orchestrator = harness.create_orchestrator();
    let result = orchestrator.run().await;

    assert!(matches!(
        result,
        Err(OrchestratorError::Manager(ManagerError::Unauthorized))
    ));
    assert_eq!(harness.provider.search_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_upload_failure_records_error_and_continues() {
    let harness = TestHarness::new();
    harness
        .manager
        .set_wanted_movies(vec![
            fixtures::movie_item("m1", "Nomad", Some(2021)),
            fixtures::movie_item("m2", "Arrival", Some(2016)),
        ])
        .await;
    harness.manager.set_fail_uploads(true).await;
    harness
        .provider
        .set_query_handler(|q| {
            Some(vec![fixtures::candidate(
                &format!("{}.1080p.WEB", q.query.replace(' ', ".")),
                "r1",
            )])
        })
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    // Both items were attempted; one failure never aborts the run.
    assert_eq!(summary.items_processed, 2);
    assert_eq!(summary.failed, 2);

    for id in ["m1", "m2"] {
        let entry = orchestrator.tracker().get(ItemKind::Movie, id).unwrap();
        assert_eq!(entry.last_result, SearchOutcome::Error);
    }
}

#[tokio::test(start_paused = true)]
async fn test_transient_search_error_moves_to_next_pattern() {
    let harness = TestHarness::new();
    let mut episode = fixtures::episode_item("e1", "Show Name", 1, 2);
    episode.episode_title = Some("The Heist".to_string());
    harness.manager.set_wanted_episodes(vec![episode]).await;

    harness
        .provider
        .push_search_error(ProviderError::Timeout)
        .await;
    harness
        .provider
        .set_results(vec![fixtures::candidate("Show.Name.S01E02.WEB", "r1")])
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    // Pattern 1 timed out, pattern 2 matched.
    assert_eq!(summary.acquired, 1);
    assert_eq!(harness.provider.search_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_scratch_files_cleaned_up() {
    let harness = TestHarness::new();
    harness
        .manager
        .set_wanted_movies(vec![fixtures::movie_item("m1", "Nomad", Some(2021))])
        .await;
    harness
        .provider
        .set_results(vec![fixtures::candidate("Nomad.2021.1080p.WEB", "r1")])
        .await;

    let mut orchestrator = harness.create_orchestrator();
    orchestrator.run().await.unwrap();

    // Nothing retained after a successful upload.
    let entries: Vec<_> = std::fs::read_dir(harness.download_dir())
        .map(|dir| dir.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(entries.is_empty(), "scratch files left behind: {:?}", entries);
}

#[tokio::test(start_paused = true)]
async fn test_partial_language_satisfaction_is_monotonic() {
    let harness = TestHarness::new();
    let mut movie = fixtures::movie_item("m1", "Nomad", Some(2021));
    movie.wanted_languages = vec![LanguageSpec::plain("en"), LanguageSpec::plain("fr")];
    harness.manager.set_wanted_movies(vec![movie]).await;

    // Only an English subtitle exists.
    harness
        .provider
        .set_results(vec![fixtures::candidate("Nomad.2021.1080p.WEB", "r1")])
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.acquired, 1);
    assert_eq!(summary.not_found, 1);

    // The later not_found for French must not unmark English.
    let entry = orchestrator.tracker().get(ItemKind::Movie, "m1").unwrap();
    assert_eq!(entry.last_result, SearchOutcome::NotFound);
    assert!(entry.is_satisfied("en"));
    assert!(!entry.is_satisfied("fr"));
}

#[tokio::test(start_paused = true)]
async fn test_missing_interval_uses_fallback() {
    let harness = TestHarness::new();
    harness.manager.set_interval_hours(None).await;
    harness
        .manager
        .set_wanted_movies(vec![fixtures::movie_item("m1", "Nomad", Some(2021))])
        .await;
    harness
        .provider
        .set_results(vec![fixtures::candidate("Nomad.2021.1080p.WEB", "r1")])
        .await;

    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.acquired, 1);
}

#[tokio::test(start_paused = true)]
async fn test_satisfied_language_not_retried_on_next_run() {
    let harness = TestHarness::new();
    harness
        .manager
        .set_wanted_movies(vec![fixtures::movie_item("m1", "Nomad", Some(2021))])
        .await;
    harness
        .provider
        .set_results(vec![fixtures::candidate("Nomad.2021.1080p.WEB", "r1")])
        .await;

    {
        let mut orchestrator = harness.create_orchestrator();
        let summary = orchestrator.run().await.unwrap();
        assert_eq!(summary.acquired, 1);
    }

    // Second run, fresh orchestrator over the persisted tracker: the
    // satisfied language is skipped without any searching.
    let mut orchestrator = harness.create_orchestrator();
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.acquired, 0);
    assert_eq!(harness.provider.search_count().await, 1);
}
