//! JSON-file tracker store.
//!
//! The store is a single pretty-printed JSON file so operators can inspect
//! or hand-edit it. Deleting it resets everything to "never searched".

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::manager::ItemKind;

use super::types::{SearchOutcome, TrackerError, TrackingEntry};

/// Persisted map of per-item search attempts. Sole mutator of the store.
#[derive(Debug)]
pub struct Tracker {
    path: PathBuf,
    entries: BTreeMap<String, TrackingEntry>,
}

impl Tracker {
    /// Load the store from `path`.
    ///
    /// A missing or corrupt file degrades to an empty map; corruption is
    /// logged, never fatal to the run.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), "Corrupt tracker store, starting empty: {}", e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), "Unreadable tracker store, starting empty: {}", e);
                BTreeMap::new()
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "Tracker loaded");
        Self { path, entries }
    }

    fn key(kind: ItemKind, id: &str) -> String {
        format!("{}:{}", kind, id)
    }

    /// Look up the entry for an item.
    pub fn get(&self, kind: ItemKind, id: &str) -> Option<&TrackingEntry> {
        self.entries.get(&Self::key(kind, id))
    }

    /// Record an attempt and persist synchronously.
    ///
    /// Satisfied languages merge monotonically: a language marked satisfied
    /// stays satisfied through later `not_found`/`error` results for other
    /// languages.
    pub fn record(
        &mut self,
        kind: ItemKind,
        id: &str,
        result: SearchOutcome,
        languages_satisfied: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), TrackerError> {
        let entry = self
            .entries
            .entry(Self::key(kind, id))
            .or_insert_with(|| TrackingEntry {
                last_attempted_at: now,
                last_result: result,
                language_states: BTreeMap::new(),
            });

        entry.last_attempted_at = now;
        entry.last_result = result;
        for language in languages_satisfied {
            entry.language_states.insert(language.clone(), true);
        }

        self.persist()
    }

    /// Write the store atomically: serialize to a sibling temp file, then
    /// rename over the store path. Readers never observe a torn write.
    fn persist(&self) -> Result<(), TrackerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "Tracker persisted");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store file path, for diagnostics.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
