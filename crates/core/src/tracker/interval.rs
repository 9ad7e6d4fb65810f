//! Eligibility predicate for new search attempts.
//!
//! The interval is supplied by the caller on every call — it originates in
//! the media manager's own search-task setting, which this system reads but
//! does not own. Nothing here caches or invents a default.

use chrono::{DateTime, Duration, Utc};

use super::types::TrackingEntry;

/// Decide whether a new search attempt for `language` is due.
///
/// Rules:
/// - no entry → eligible (never searched);
/// - language already satisfied → not eligible;
/// - otherwise eligible once `now - last_attempted_at >= interval`. An
///   unsatisfied language follows the interval even when the last attempt
///   succeeded for a different language; `language_states` is the
///   per-language source of truth.
///
/// Pure function: same inputs, same answer.
pub fn eligible(
    entry: Option<&TrackingEntry>,
    language: &str,
    now: DateTime<Utc>,
    interval: Duration,
) -> bool {
    let Some(entry) = entry else {
        return true;
    };

    if entry.is_satisfied(language) {
        return false;
    }

    now.signed_duration_since(entry.last_attempted_at) >= interval
}
