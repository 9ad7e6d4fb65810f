//! Types for the search-attempt tracker.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of the most recent search attempt for an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    Found,
    NotFound,
    Error,
}

/// Persisted record of past attempts for one item.
///
/// An entry exists only after at least one attempt; absence means "never
/// searched". Keyed by `"{kind}:{id}"` in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEntry {
    pub last_attempted_at: DateTime<Utc>,
    pub last_result: SearchOutcome,
    /// Language code → whether a subtitle was already acquired. Once true,
    /// never reset by later attempts for other languages.
    #[serde(default)]
    pub language_states: BTreeMap<String, bool>,
}

impl TrackingEntry {
    /// Whether the given language is already satisfied.
    pub fn is_satisfied(&self, language: &str) -> bool {
        self.language_states.get(language).copied().unwrap_or(false)
    }
}

/// Errors from the tracker store.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tracker store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&SearchOutcome::NotFound).unwrap(),
            "\"not_found\""
        );
        assert_eq!(serde_json::to_string(&SearchOutcome::Found).unwrap(), "\"found\"");

        let outcome: SearchOutcome = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(outcome, SearchOutcome::Error);
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = TrackingEntry {
            last_attempted_at: Utc::now(),
            last_result: SearchOutcome::Found,
            language_states: BTreeMap::from([("en".to_string(), true)]),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: TrackingEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.last_result, SearchOutcome::Found);
        assert!(parsed.is_satisfied("en"));
        assert!(!parsed.is_satisfied("fr"));
    }

    #[test]
    fn test_entry_language_states_default() {
        let json = r#"{
            "last_attempted_at": "2026-01-15T10:00:00Z",
            "last_result": "not_found"
        }"#;
        let parsed: TrackingEntry = serde_json::from_str(json).unwrap();
        assert!(parsed.language_states.is_empty());
    }
}
