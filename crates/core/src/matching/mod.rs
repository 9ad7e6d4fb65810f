//! Query generation and candidate matching.
//!
//! `PatternGenerator` turns an item into an ordered list of search queries;
//! `ResultMatcher` decides which raw search result, if any, actually
//! corresponds to the item. Both are pure over their inputs.

mod matcher;
mod patterns;

pub use matcher::{extract_episode_tag, EpisodeTag, MatchResult, ResultMatcher};
pub use patterns::{PatternGenerator, PatternKind, SearchPattern};
