//! Orchestrator library for the resumable company enrichment pipeline
//!
//! Wires candidate discovery and enrichment from `fetcher` to the gate,
//! merge rules, checkpoint store and CSV output, behind injectable traits.

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{Args, EnrichStrategy, RunConfig};
pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::{Orchestrator, RunSummary, CHECKPOINT_EVERY};
pub use services::{CsvOutputWriter, JsonProgressStore};
pub use traits::{MockOutputWriter, MockProgressStore, OutputWriter, ProgressStore};
