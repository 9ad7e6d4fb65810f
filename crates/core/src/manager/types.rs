//! Types for the media-management API.
//!
//! The media manager is the system of record for which movies and episodes
//! are missing subtitles. Items returned here drive the whole acquisition
//! run; nothing else in the crate talks to the manager directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Whether an item is a movie or a TV episode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Movie,
    Episode,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Movie => write!(f, "movie"),
            ItemKind::Episode => write!(f, "episode"),
        }
    }
}

/// One wanted subtitle language, with its variant flags.
///
/// Forced and hearing-impaired subtitles are distinct artifacts; a candidate
/// only satisfies a spec whose flags match exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Language code as reported by the manager (e.g. "en").
    pub code: String,
    #[serde(default)]
    pub forced: bool,
    #[serde(default)]
    pub hearing_impaired: bool,
}

impl LanguageSpec {
    /// Plain (non-forced, non-HI) language spec.
    pub fn plain(code: &str) -> Self {
        Self {
            code: code.to_string(),
            forced: false,
            hearing_impaired: false,
        }
    }
}

impl fmt::Display for LanguageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if self.forced {
            write!(f, ":forced")?;
        }
        if self.hearing_impaired {
            write!(f, ":hi")?;
        }
        Ok(())
    }
}

/// A movie or episode that is missing one or more subtitle languages.
///
/// `kind` + `id` uniquely identify an item across runs; the id is opaque and
/// owned by the media manager. Episode items always carry `series_title`,
/// `season` and `episode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub id: String,
    pub title: String,
    /// Release year, when the manager knows it (movies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Series title (episodes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Episode title (episodes, when known).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,
    /// Release-derived filename hint, when the manager has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_name: Option<String>,
    /// Languages the manager reports as missing for this item.
    pub wanted_languages: Vec<LanguageSpec>,
}

impl Item {
    /// Human-readable label for logging.
    pub fn describe(&self) -> String {
        match self.kind {
            ItemKind::Movie => match self.year {
                Some(year) => format!("{} ({})", self.title, year),
                None => self.title.clone(),
            },
            ItemKind::Episode => format!(
                "{} S{:02}E{:02}",
                self.series_title.as_deref().unwrap_or(&self.title),
                self.season.unwrap_or(0),
                self.episode.unwrap_or(0),
            ),
        }
    }
}

/// Errors from the media-management API.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// 401/403 from the manager. Fatal: no further progress is possible.
    #[error("media manager rejected credentials")]
    Unauthorized,

    #[error("media manager connection failed: {0}")]
    ConnectionFailed(String),

    #[error("media manager request timed out")]
    Timeout,

    #[error("media manager API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("failed to parse media manager response: {0}")]
    ParseError(String),

    #[error("subtitle file error: {0}")]
    Io(#[from] std::io::Error),
}

/// The media-management API surface consumed by the orchestrator.
#[async_trait]
pub trait MediaManager: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &str;

    /// Movies currently missing subtitles.
    async fn wanted_movies(&self) -> Result<Vec<Item>, ManagerError>;

    /// Episodes currently missing subtitles, enriched with series titles.
    async fn wanted_episodes(&self) -> Result<Vec<Item>, ManagerError>;

    /// The manager's own configured search-task interval, in hours.
    ///
    /// Returns `None` when the manager does not report one; the caller
    /// supplies its configured fallback.
    async fn search_interval_hours(&self) -> Result<Option<u32>, ManagerError>;

    /// Upload a subtitle file for an item.
    async fn upload_subtitle(
        &self,
        item: &Item,
        language: &LanguageSpec,
        subtitle_file: &Path,
    ) -> Result<(), ManagerError>;
}
