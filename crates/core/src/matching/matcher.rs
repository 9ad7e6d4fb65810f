//! Candidate selection against a target item.
//!
//! Search results come back loosely labeled; for episodes the only safe
//! attribution is an explicit season/episode tag in the release name.
//! Selection is deterministic: quality rating first, then the originating
//! pattern's priority, then source-list position.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::manager::{Item, ItemKind, LanguageSpec};
use crate::provider::Candidate;

/// `S01E02` / `s1e2` style tags.
static SEASON_EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)s(\d{1,2})e(\d{1,3})").unwrap());

/// `1x02` style tags. Word boundaries keep resolution strings like
/// `1280x720` from matching.
static CROSS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})x(\d{2,3})\b").unwrap());

/// A selected candidate with diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate: Candidate,
    /// The candidate's position in the API's relevance order (0 = first).
    pub confidence: u32,
    /// Why this candidate was selected.
    pub reason: String,
}

/// Outcome of episode-tag extraction from a release name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeTag {
    /// No season/episode token present. Scene-name-only releases cannot be
    /// safely attributed.
    Missing,
    /// More than one distinct tag (multi-episode pack).
    Ambiguous,
    Tag { season: u32, episode: u32 },
}

/// Extract the episode tag from a release name.
pub fn extract_episode_tag(release_name: &str) -> EpisodeTag {
    let mut tags: Vec<(u32, u32)> = Vec::new();

    for captures in SEASON_EPISODE_RE.captures_iter(release_name) {
        if let (Ok(season), Ok(episode)) = (captures[1].parse(), captures[2].parse()) {
            tags.push((season, episode));
        }
    }
    for captures in CROSS_RE.captures_iter(release_name) {
        if let (Ok(season), Ok(episode)) = (captures[1].parse(), captures[2].parse()) {
            tags.push((season, episode));
        }
    }

    tags.sort_unstable();
    tags.dedup();

    match tags.as_slice() {
        [] => EpisodeTag::Missing,
        [(season, episode)] => EpisodeTag::Tag {
            season: *season,
            episode: *episode,
        },
        _ => EpisodeTag::Ambiguous,
    }
}

/// Selects the best candidate for an item and language.
#[derive(Debug, Clone, Default)]
pub struct ResultMatcher;

impl ResultMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Pick the best candidate, or `None` when nothing survives filtering.
    ///
    /// `None` is not an error; it tells the orchestrator to try the next
    /// pattern.
    pub fn select(
        &self,
        item: &Item,
        candidates: &[Candidate],
        language: &LanguageSpec,
    ) -> Option<MatchResult> {
        let eligible: Vec<(usize, &Candidate)> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| Self::language_matches(c, language))
            .collect();

        match item.kind {
            ItemKind::Movie => Self::select_movie(&eligible),
            ItemKind::Episode => Self::select_episode(item, &eligible),
        }
    }

    /// Hard filter: language code plus variant flags must match exactly.
    fn language_matches(candidate: &Candidate, language: &LanguageSpec) -> bool {
        candidate.language.eq_ignore_ascii_case(&language.code)
            && candidate.forced == language.forced
            && candidate.hearing_impaired == language.hearing_impaired
    }

    /// Movies: the query already scoped title and year, so the first
    /// candidate in the API's relevance order is accepted as-is. This also
    /// covers year-less queries with mixed-year results.
    fn select_movie(eligible: &[(usize, &Candidate)]) -> Option<MatchResult> {
        eligible.first().map(|(rank, candidate)| MatchResult {
            candidate: (*candidate).clone(),
            confidence: *rank as u32,
            reason: format!("first relevance-ordered result (rank {})", rank),
        })
    }

    fn select_episode(item: &Item, eligible: &[(usize, &Candidate)]) -> Option<MatchResult> {
        let (season, episode) = match (item.season, item.episode) {
            (Some(season), Some(episode)) => (season, episode),
            _ => return None,
        };

        let survivors: Vec<(usize, &Candidate)> = eligible
            .iter()
            .filter(|(_, candidate)| match extract_episode_tag(&candidate.release_name) {
                EpisodeTag::Tag {
                    season: tag_season,
                    episode: tag_episode,
                } => tag_season == season && tag_episode == episode,
                EpisodeTag::Missing => {
                    debug!(release = %candidate.release_name, "Skipping candidate without episode tag");
                    false
                }
                EpisodeTag::Ambiguous => {
                    debug!(release = %candidate.release_name, "Skipping multi-episode candidate");
                    false
                }
            })
            .copied()
            .collect();

        let best = survivors.iter().max_by(|a, b| Self::rank(a, b))?;

        let reason = match best.1.rating {
            Some(rating) => format!(
                "episode tag S{:02}E{:02} matched (rating {:.1})",
                season, episode, rating
            ),
            None => format!("episode tag S{:02}E{:02} matched", season, episode),
        };

        Some(MatchResult {
            candidate: best.1.clone(),
            confidence: best.0 as u32,
            reason,
        })
    }

    /// Ordering for selection: rating (unrated lowest), then earlier
    /// pattern, then earlier list position. Greater = preferred.
    fn rank(a: &(usize, &Candidate), b: &(usize, &Candidate)) -> Ordering {
        let rating_a = a.1.rating.unwrap_or(f32::NEG_INFINITY);
        let rating_b = b.1.rating.unwrap_or(f32::NEG_INFINITY);
        rating_a
            .partial_cmp(&rating_b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.1.pattern_priority.cmp(&a.1.pattern_priority))
            .then_with(|| b.0.cmp(&a.0))
    }
}
