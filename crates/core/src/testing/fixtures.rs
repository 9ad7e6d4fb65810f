//! Shared test fixtures.

use crate::manager::{Item, ItemKind, LanguageSpec};
use crate::provider::Candidate;

/// A wanted movie missing an English subtitle.
pub fn movie_item(id: &str, title: &str, year: Option<u32>) -> Item {
    Item {
        kind: ItemKind::Movie,
        id: id.to_string(),
        title: title.to_string(),
        year,
        series_title: None,
        season: None,
        episode: None,
        episode_title: None,
        scene_name: None,
        wanted_languages: vec![LanguageSpec::plain("en")],
    }
}

/// A wanted episode missing an English subtitle.
pub fn episode_item(id: &str, series: &str, season: u32, episode: u32) -> Item {
    Item {
        kind: ItemKind::Episode,
        id: id.to_string(),
        title: format!("Episode {}", episode),
        year: None,
        series_title: Some(series.to_string()),
        season: Some(season),
        episode: Some(episode),
        episode_title: None,
        scene_name: None,
        wanted_languages: vec![LanguageSpec::plain("en")],
    }
}

/// A plain English candidate.
pub fn candidate(release_name: &str, download_ref: &str) -> Candidate {
    Candidate {
        release_name: release_name.to_string(),
        language: "en".to_string(),
        forced: false,
        hearing_impaired: false,
        download_ref: download_ref.to_string(),
        rating: None,
        uploader: None,
        pattern_priority: 0,
    }
}

/// A rated English candidate.
pub fn rated_candidate(release_name: &str, download_ref: &str, rating: f32) -> Candidate {
    Candidate {
        rating: Some(rating),
        ..candidate(release_name, download_ref)
    }
}
