//! Types for the subtitle-search API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// One search request against the subtitle-search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleQuery {
    /// Free-text query string, built by the pattern generator.
    pub query: String,
    /// Language code to search for.
    pub language: String,
    /// Priority of the pattern this query came from (lower = earlier).
    /// Carried through to candidates as a tie-breaker.
    #[serde(default)]
    pub pattern_priority: u32,
}

/// A raw subtitle search result, in the API's own relevance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Release name as reported by the search service.
    pub release_name: String,
    /// Language code of the subtitle.
    pub language: String,
    #[serde(default)]
    pub forced: bool,
    #[serde(default)]
    pub hearing_impaired: bool,
    /// Opaque handle used to download the subtitle archive.
    pub download_ref: String,
    /// Uploader-community quality rating, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Uploader name, diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    /// Priority of the search pattern that produced this candidate.
    #[serde(default)]
    pub pattern_priority: u32,
}

/// Errors from the subtitle-search API.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("subtitle provider connection failed: {0}")]
    ConnectionFailed(String),

    #[error("subtitle provider request timed out")]
    Timeout,

    #[error("subtitle provider API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// 429 from the search API. The orchestrator backs off before the next
    /// call and abandons the item if it recurs immediately.
    #[error("subtitle provider rate limited")]
    RateLimited {
        /// Server-suggested wait, when a Retry-After header was present.
        retry_after: Option<Duration>,
    },

    #[error("failed to parse subtitle provider response: {0}")]
    ParseError(String),

    #[error("subtitle archive error: {0}")]
    Archive(String),

    #[error("download I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for subtitle-search backends.
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Execute one search, returning candidates in relevance order.
    async fn search(&self, query: &SubtitleQuery) -> Result<Vec<Candidate>, ProviderError>;

    /// Download the candidate's archive and extract the subtitle file into
    /// `dest_dir`, returning the extracted file's path.
    async fn download(
        &self,
        candidate: &Candidate,
        dest_dir: &Path,
    ) -> Result<PathBuf, ProviderError>;
}
