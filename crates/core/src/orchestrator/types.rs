//! Types for the acquisition orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::manager::ManagerError;

/// Errors that abort an acquisition run.
///
/// Per-item failures never surface here; they are recorded against the item
/// and the run continues.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Media-manager failure while fetching the work list or settings, or
    /// an authentication rejection anywhere.
    #[error("media manager error: {0}")]
    Manager(#[from] ManagerError),
}

/// Terminal outcome for one (item, language) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LanguageOutcome {
    /// Not eligible yet; no search issued, no tracker write.
    Skipped,
    /// Subtitle downloaded and uploaded to the manager.
    Acquired { release_name: String },
    /// All patterns exhausted without a match.
    NotFound,
    /// Unrecoverable error for this pair; recorded as `error`.
    Failed { reason: String },
}

/// Accounting for one full run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub items_processed: usize,
    pub languages_considered: usize,
    pub acquired: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Fold one language outcome into the counters.
    pub fn tally(&mut self, outcome: &LanguageOutcome) {
        self.languages_considered += 1;
        match outcome {
            LanguageOutcome::Skipped => self.skipped += 1,
            LanguageOutcome::Acquired { .. } => self.acquired += 1,
            LanguageOutcome::NotFound => self.not_found += 1,
            LanguageOutcome::Failed { .. } => self.failed += 1,
        }
    }
}
