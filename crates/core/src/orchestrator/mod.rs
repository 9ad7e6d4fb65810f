//! Acquisition orchestration.
//!
//! One run processes every wanted item sequentially: eligibility check,
//! pattern-ordered searching with a short-circuit on the first match, then
//! download, upload and tracker update. The search API is throttled by a
//! global inter-call delay floor.

mod config;
mod runner;
mod throttle;
mod types;

pub use config::OrchestratorConfig;
pub use runner::AcquisitionOrchestrator;
pub use throttle::CallGate;
pub use types::{LanguageOutcome, OrchestratorError, RunSummary};
