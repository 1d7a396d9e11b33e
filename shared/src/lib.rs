//! Shared types for the company enrichment pipeline
//!
//! Contains the record shapes that cross crate boundaries, the upstream
//! failure taxonomy, the tolerant JSON field helpers and the stage-aware
//! logging macros used by both the fetcher and the orchestrator.

pub mod errors;
pub mod extract;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
