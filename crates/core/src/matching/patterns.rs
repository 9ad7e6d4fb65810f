//! Search query pattern generation.
//!
//! Each item gets an ordered list of query strategies. Movies need exactly
//! one query; episodes get up to three with decreasing reliability, tried
//! in the configured order until one produces a match.

use serde::{Deserialize, Serialize};

use crate::manager::{Item, ItemKind};

/// One query-construction strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Movie title (+ year when known). The only movie pattern.
    Title,
    /// `"{series} S01E02"` — the primary episode pattern.
    SeasonEpisode,
    /// `"{series} {episode title}"` — only when the episode title is known.
    EpisodeTitle,
    /// The release scene name verbatim — only when present.
    SceneName,
}

/// A generated search query with its position in the try order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPattern {
    pub kind: PatternKind,
    pub query: String,
    /// Ordinal in the try order; lower is tried first.
    pub priority: u32,
}

/// Generates the ordered query list for an item.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    /// Episode pattern kinds in try order. `Title` entries are ignored here;
    /// movies always get the single title pattern.
    episode_kinds: Vec<PatternKind>,
}

impl PatternGenerator {
    pub fn new(episode_kinds: Vec<PatternKind>) -> Self {
        Self { episode_kinds }
    }

    /// Generate patterns for an item, in try order.
    ///
    /// Patterns whose source field is missing are skipped, and duplicate
    /// queries (identical after normalization) keep only their earliest
    /// position.
    pub fn generate(&self, item: &Item) -> Vec<SearchPattern> {
        let raw = match item.kind {
            ItemKind::Movie => self.movie_patterns(item),
            ItemKind::Episode => self.episode_patterns(item),
        };

        let mut seen = std::collections::HashSet::new();
        raw.into_iter()
            .filter(|p| !p.query.is_empty())
            .filter(|p| seen.insert(normalize(&p.query)))
            .enumerate()
            .map(|(priority, pattern)| SearchPattern {
                priority: priority as u32,
                ..pattern
            })
            .collect()
    }

    fn movie_patterns(&self, item: &Item) -> Vec<SearchPattern> {
        let query = match item.year {
            Some(year) => format!("{} {}", item.title, year),
            None => item.title.clone(),
        };
        vec![SearchPattern {
            kind: PatternKind::Title,
            query,
            priority: 0,
        }]
    }

    fn episode_patterns(&self, item: &Item) -> Vec<SearchPattern> {
        let series = item
            .series_title
            .as_deref()
            .unwrap_or(item.title.as_str());

        self.episode_kinds
            .iter()
            .filter_map(|kind| {
                let query = match kind {
                    PatternKind::SeasonEpisode => match (item.season, item.episode) {
                        (Some(season), Some(episode)) => {
                            Some(format!("{} S{:02}E{:02}", series, season, episode))
                        }
                        _ => None,
                    },
                    PatternKind::EpisodeTitle => item
                        .episode_title
                        .as_deref()
                        .filter(|t| !t.is_empty())
                        .map(|title| format!("{} {}", series, title)),
                    PatternKind::SceneName => item
                        .scene_name
                        .as_deref()
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                    PatternKind::Title => None,
                };
                query.map(|query| SearchPattern {
                    kind: *kind,
                    query,
                    priority: 0,
                })
            })
            .collect()
    }
}

impl Default for PatternGenerator {
    fn default() -> Self {
        Self::new(vec![
            PatternKind::SeasonEpisode,
            PatternKind::EpisodeTitle,
            PatternKind::SceneName,
        ])
    }
}

/// Normalize a query for duplicate suppression: lowercase, collapsed
/// whitespace.
fn normalize(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
