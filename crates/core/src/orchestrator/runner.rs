//! Acquisition run driver.
//!
//! Items are processed strictly one at a time; within an item, each missing
//! language runs through: eligibility check → pattern search loop → match →
//! download/extract → upload → tracker write. The first matching pattern
//! short-circuits the rest. A failure never aborts the run unless the media
//! manager rejects our credentials.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::manager::{Item, LanguageSpec, ManagerError, MediaManager};
use crate::matching::{MatchResult, PatternGenerator, ResultMatcher};
use crate::provider::{remove_scratch_file, ProviderError, SubtitleProvider, SubtitleQuery};
use crate::tracker::{eligible, SearchOutcome, Tracker};

use super::config::OrchestratorConfig;
use super::throttle::CallGate;
use super::types::{LanguageOutcome, OrchestratorError, RunSummary};

/// Failure while handing a matched candidate off to download and upload.
#[derive(Debug, Error)]
enum HandOffError {
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    Manager(#[from] ManagerError),
}

/// Drives one full acquisition run over the wanted items.
pub struct AcquisitionOrchestrator {
    config: OrchestratorConfig,
    manager: Arc<dyn MediaManager>,
    provider: Arc<dyn SubtitleProvider>,
    generator: PatternGenerator,
    matcher: ResultMatcher,
    tracker: Tracker,
    gate: CallGate,
}

impl AcquisitionOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        manager: Arc<dyn MediaManager>,
        provider: Arc<dyn SubtitleProvider>,
        tracker: Tracker,
    ) -> Self {
        let generator = PatternGenerator::new(config.episode_patterns.clone());
        let gate = CallGate::new(config.min_call_delay, config.rate_limit_backoff);

        Self {
            config,
            manager,
            provider,
            generator,
            matcher: ResultMatcher::new(),
            tracker,
            gate,
        }
    }

    /// Tracker state, for diagnostics and tests.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Execute one run: fetch the interval and wanted lists, process every
    /// item sequentially, return the accounting.
    pub async fn run(&mut self) -> Result<RunSummary, OrchestratorError> {
        let interval_hours = match self.manager.search_interval_hours().await {
            Ok(Some(hours)) => hours,
            Ok(None) => {
                debug!("Manager reports no search interval, using fallback");
                self.config.fallback_interval_hours
            }
            Err(ManagerError::Unauthorized) => return Err(ManagerError::Unauthorized.into()),
            Err(e) => {
                warn!("Could not read search interval from manager: {}", e);
                self.config.fallback_interval_hours
            }
        };
        let interval = ChronoDuration::hours(i64::from(interval_hours));

        let mut items: Vec<Item> = Vec::new();
        if self.config.movies_enabled {
            items.extend(self.manager.wanted_movies().await?);
        }
        if self.config.episodes_enabled {
            items.extend(self.manager.wanted_episodes().await?);
        }

        info!(
            items = items.len(),
            interval_hours, "Starting acquisition run"
        );

        let mut summary = RunSummary::default();
        for item in &items {
            summary.items_processed += 1;
            for language in self.wanted_languages(item) {
                let outcome = self.acquire_language(item, &language, interval).await?;
                match &outcome {
                    LanguageOutcome::Skipped => {
                        debug!(item = %item.describe(), language = %language, "Within retry interval, skipped");
                    }
                    LanguageOutcome::Acquired { release_name } => {
                        info!(item = %item.describe(), language = %language, release = %release_name, "Subtitle acquired");
                    }
                    LanguageOutcome::NotFound => {
                        info!(item = %item.describe(), language = %language, "No matching subtitles");
                    }
                    LanguageOutcome::Failed { reason } => {
                        warn!(item = %item.describe(), language = %language, "Acquisition failed: {}", reason);
                    }
                }
                summary.tally(&outcome);
            }
        }

        info!(
            acquired = summary.acquired,
            skipped = summary.skipped,
            not_found = summary.not_found,
            failed = summary.failed,
            "Acquisition run complete"
        );
        Ok(summary)
    }

    /// The item's missing languages, intersected with the configured
    /// allowlist.
    fn wanted_languages(&self, item: &Item) -> Vec<LanguageSpec> {
        item.wanted_languages
            .iter()
            .filter(|language| {
                self.config.language_filter.is_empty()
                    || self
                        .config
                        .language_filter
                        .iter()
                        .any(|code| code.eq_ignore_ascii_case(&language.code))
            })
            .cloned()
            .collect()
    }

    /// Drive one (item, language) pair to its terminal outcome.
    ///
    /// Only an authentication rejection propagates; everything else becomes
    /// a recorded outcome.
    async fn acquire_language(
        &mut self,
        item: &Item,
        language: &LanguageSpec,
        interval: ChronoDuration,
    ) -> Result<LanguageOutcome, OrchestratorError> {
        let now = Utc::now();
        let entry = self.tracker.get(item.kind, &item.id);
        if !eligible(entry, &language.code, now, interval) {
            // Terminal without a tracker write.
            return Ok(LanguageOutcome::Skipped);
        }

        let patterns = self.generator.generate(item);
        for pattern in &patterns {
            debug!(item = %item.describe(), query = %pattern.query, "Trying search pattern");

            let query = SubtitleQuery {
                query: pattern.query.clone(),
                language: language.code.clone(),
                pattern_priority: pattern.priority,
            };

            self.gate.acquire().await;
            let candidates = match self.provider.search(&query).await {
                Ok(candidates) => candidates,
                Err(ProviderError::RateLimited { retry_after }) => {
                    warn!(item = %item.describe(), "Rate limited, backing off");
                    self.gate.penalize(retry_after);
                    self.gate.acquire().await;
                    match self.provider.search(&query).await {
                        Ok(candidates) => candidates,
                        Err(ProviderError::RateLimited { retry_after }) => {
                            // Recurred immediately: abandon the item for
                            // this run rather than looping.
                            self.gate.penalize(retry_after);
                            self.record(item, SearchOutcome::Error, &[]);
                            return Ok(LanguageOutcome::Failed {
                                reason: "rate limited twice in a row".to_string(),
                            });
                        }
                        Err(e) => {
                            warn!(item = %item.describe(), query = %query.query, "Search failed: {}", e);
                            continue;
                        }
                    }
                }
                Err(e) => {
                    // Transient failure: this pattern is spent for the run.
                    warn!(item = %item.describe(), query = %query.query, "Search failed: {}", e);
                    continue;
                }
            };

            let Some(matched) = self.matcher.select(item, &candidates, language) else {
                debug!(
                    item = %item.describe(),
                    candidates = candidates.len(),
                    "No candidate matched this pattern"
                );
                continue;
            };

            debug!(
                item = %item.describe(),
                release = %matched.candidate.release_name,
                reason = %matched.reason,
                "Candidate selected"
            );

            // Short-circuit: remaining patterns are not searched.
            return match self.hand_off(item, language, &matched).await {
                Ok(()) => {
                    self.record(item, SearchOutcome::Found, &[language.code.clone()]);
                    Ok(LanguageOutcome::Acquired {
                        release_name: matched.candidate.release_name.clone(),
                    })
                }
                Err(HandOffError::Manager(ManagerError::Unauthorized)) => {
                    Err(ManagerError::Unauthorized.into())
                }
                Err(e) => {
                    self.record(item, SearchOutcome::Error, &[]);
                    Ok(LanguageOutcome::Failed {
                        reason: e.to_string(),
                    })
                }
            };
        }

        self.record(item, SearchOutcome::NotFound, &[]);
        Ok(LanguageOutcome::NotFound)
    }

    /// Download, extract and upload a matched candidate. The scratch file
    /// is removed whether or not the upload succeeds.
    async fn hand_off(
        &mut self,
        item: &Item,
        language: &LanguageSpec,
        matched: &MatchResult,
    ) -> Result<(), HandOffError> {
        // The download hits the same API as search and shares the gate.
        self.gate.acquire().await;
        let subtitle_file = match self
            .provider
            .download(&matched.candidate, &self.config.download_dir)
            .await
        {
            Ok(path) => path,
            Err(ProviderError::RateLimited { retry_after }) => {
                self.gate.penalize(retry_after);
                return Err(ProviderError::RateLimited { retry_after }.into());
            }
            Err(e) => return Err(e.into()),
        };

        let upload = self
            .manager
            .upload_subtitle(item, language, &subtitle_file)
            .await;
        remove_scratch_file(&subtitle_file);

        upload.map_err(HandOffError::from)
    }

    fn record(&mut self, item: &Item, result: SearchOutcome, satisfied: &[String]) {
        if let Err(e) = self
            .tracker
            .record(item.kind, &item.id, result, satisfied, Utc::now())
        {
            warn!(item = %item.describe(), "Failed to persist tracker entry: {}", e);
        }
    }
}
