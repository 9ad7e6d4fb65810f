//! Mock subtitle provider for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::provider::{Candidate, ProviderError, SubtitleProvider, SubtitleQuery};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub query: SubtitleQuery,
    /// When the search was made (virtual time under a paused runtime).
    pub timestamp: Instant,
}

/// A query handler that produces results dynamically based on the query.
type QueryHandler = Box<dyn Fn(&SubtitleQuery) -> Option<Vec<Candidate>> + Send + Sync>;

/// Mock implementation of the [`SubtitleProvider`] trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidates, statically or per query
/// - Track searches and downloads, with timestamps for spacing assertions
/// - Queue errors to simulate failures and rate limiting
pub struct MockSubtitleProvider {
    results: Arc<RwLock<Vec<Candidate>>>,
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// Errors returned by upcoming searches, in order, before any results.
    search_errors: Arc<RwLock<VecDeque<ProviderError>>>,
    /// If set, the next download fails with this error.
    next_download_error: Arc<RwLock<Option<ProviderError>>>,
    downloads: Arc<RwLock<Vec<Candidate>>>,
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
}

impl std::fmt::Debug for MockSubtitleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSubtitleProvider").finish_non_exhaustive()
    }
}

impl Default for MockSubtitleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubtitleProvider {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            search_errors: Arc::new(RwLock::new(VecDeque::new())),
            next_download_error: Arc::new(RwLock::new(None)),
            downloads: Arc::new(RwLock::new(Vec::new())),
            query_handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the candidates returned by subsequent searches.
    pub async fn set_results(&self, results: Vec<Candidate>) {
        *self.results.write().await = results;
    }

    /// Queue an error for an upcoming search. Queued errors are consumed in
    /// order before any results are returned.
    pub async fn push_search_error(&self, error: ProviderError) {
        self.search_errors.write().await.push_back(error);
    }

    /// Configure the next download to fail.
    pub async fn set_next_download_error(&self, error: ProviderError) {
        *self.next_download_error.write().await = Some(error);
    }

    /// Set a handler that produces results per query. Returning `None`
    /// falls back to the static results.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&SubtitleQuery) -> Option<Vec<Candidate>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    /// Get recorded searches.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Candidates that were downloaded.
    pub async fn downloaded(&self) -> Vec<Candidate> {
        self.downloads.read().await.clone()
    }

    pub async fn download_count(&self) -> usize {
        self.downloads.read().await.len()
    }
}

#[async_trait]
impl SubtitleProvider for MockSubtitleProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &SubtitleQuery) -> Result<Vec<Candidate>, ProviderError> {
        self.searches.write().await.push(RecordedSearch {
            query: query.clone(),
            timestamp: Instant::now(),
        });

        if let Some(error) = self.search_errors.write().await.pop_front() {
            return Err(error);
        }

        let handler = self.query_handler.read().await;
        if let Some(ref h) = *handler {
            if let Some(results) = h(query) {
                return Ok(stamp_priority(results, query.pattern_priority));
            }
        }
        drop(handler);

        Ok(stamp_priority(
            self.results.read().await.clone(),
            query.pattern_priority,
        ))
    }

    async fn download(
        &self,
        candidate: &Candidate,
        dest_dir: &Path,
    ) -> Result<PathBuf, ProviderError> {
        if let Some(error) = self.next_download_error.write().await.take() {
            return Err(error);
        }

        self.downloads.write().await.push(candidate.clone());

        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(format!("{}.srt", candidate.download_ref));
        tokio::fs::write(&path, "1\n00:00:01,000 --> 00:00:02,000\nmock\n").await?;
        Ok(path)
    }
}

/// Like the real provider, candidates carry the priority of the query that
/// produced them.
fn stamp_priority(mut candidates: Vec<Candidate>, priority: u32) -> Vec<Candidate> {
    for candidate in &mut candidates {
        candidate.pattern_priority = priority;
    }
    candidates
}
