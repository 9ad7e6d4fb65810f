//! Media-management API abstraction.
//!
//! This module provides the [`MediaManager`] trait for the system that
//! tracks subtitle completeness (wanted items, search interval, uploads),
//! plus the HTTP implementation.

mod http;
mod types;

pub use http::HttpMediaManager;
pub use types::{Item, ItemKind, LanguageSpec, ManagerError, MediaManager};
