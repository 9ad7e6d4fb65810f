//! Subtitle-search API abstraction.
//!
//! This module provides the [`SubtitleProvider`] trait for searching and
//! downloading subtitle archives, the HTTP implementation, and ZIP
//! extraction of downloaded archives.

mod archive;
mod http;
mod types;

pub use archive::{extract_subtitle, remove_scratch_file};
pub use http::HttpSubtitleProvider;
pub use types::{Candidate, ProviderError, SubtitleProvider, SubtitleQuery};
