//! Mock media manager for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::manager::{Item, ItemKind, LanguageSpec, ManagerError, MediaManager};

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub kind: ItemKind,
    pub item_id: String,
    pub language: LanguageSpec,
    pub subtitle_file: PathBuf,
}

/// Mock implementation of the [`MediaManager`] trait.
///
/// Wanted lists and the reported interval are configurable; uploads are
/// recorded. Queued errors are consumed by whichever trait call comes next,
/// which covers auth-rejection scenarios on any endpoint.
pub struct MockMediaManager {
    movies: Arc<RwLock<Vec<Item>>>,
    episodes: Arc<RwLock<Vec<Item>>>,
    interval_hours: Arc<RwLock<Option<u32>>>,
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    errors: Arc<RwLock<VecDeque<ManagerError>>>,
    /// If set, every upload fails with an API error.
    fail_uploads: Arc<RwLock<bool>>,
}

impl std::fmt::Debug for MockMediaManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMediaManager").finish_non_exhaustive()
    }
}

impl Default for MockMediaManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaManager {
    pub fn new() -> Self {
        Self {
            movies: Arc::new(RwLock::new(Vec::new())),
            episodes: Arc::new(RwLock::new(Vec::new())),
            interval_hours: Arc::new(RwLock::new(Some(24))),
            uploads: Arc::new(RwLock::new(Vec::new())),
            errors: Arc::new(RwLock::new(VecDeque::new())),
            fail_uploads: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn set_wanted_movies(&self, movies: Vec<Item>) {
        *self.movies.write().await = movies;
    }

    pub async fn set_wanted_episodes(&self, episodes: Vec<Item>) {
        *self.episodes.write().await = episodes;
    }

    /// Set the reported search interval; `None` simulates a manager that
    /// does not expose the setting.
    pub async fn set_interval_hours(&self, hours: Option<u32>) {
        *self.interval_hours.write().await = hours;
    }

    /// Queue an error for the next trait call, whichever it is.
    pub async fn push_error(&self, error: ManagerError) {
        self.errors.write().await.push_back(error);
    }

    /// Make all uploads fail with an API error.
    pub async fn set_fail_uploads(&self, fail: bool) {
        *self.fail_uploads.write().await = fail;
    }

    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    async fn take_error(&self) -> Option<ManagerError> {
        self.errors.write().await.pop_front()
    }
}

#[async_trait]
impl MediaManager for MockMediaManager {
    fn name(&self) -> &str {
        "mock"
    }

    async fn wanted_movies(&self) -> Result<Vec<Item>, ManagerError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        Ok(self.movies.read().await.clone())
    }

    async fn wanted_episodes(&self) -> Result<Vec<Item>, ManagerError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        Ok(self.episodes.read().await.clone())
    }

    async fn search_interval_hours(&self) -> Result<Option<u32>, ManagerError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        Ok(*self.interval_hours.read().await)
    }

    async fn upload_subtitle(
        &self,
        item: &Item,
        language: &LanguageSpec,
        subtitle_file: &Path,
    ) -> Result<(), ManagerError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if *self.fail_uploads.read().await {
            return Err(ManagerError::ApiError {
                status: 500,
                message: "simulated upload failure".to_string(),
            });
        }

        self.uploads.write().await.push(RecordedUpload {
            kind: item.kind,
            item_id: item.id.clone(),
            language: language.clone(),
            subtitle_file: subtitle_file.to_path_buf(),
        });
        Ok(())
    }
}
