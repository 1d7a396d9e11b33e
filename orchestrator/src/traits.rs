//! Storage seams of the orchestrator, mockable for testing

use async_trait::async_trait;

use shared::{CandidateRecord, ProgressState};
use crate::error::OrchestratorResult;

/// Persistence of the resumable checkpoint
#[mockall::automock]
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the checkpoint. Missing or unreadable checkpoints yield an empty
    /// state instead of an error.
    async fn load(&self) -> ProgressState;

    /// Replace the checkpoint with `state`. A failed save leaves the previous
    /// checkpoint intact.
    async fn save(&self, state: &ProgressState) -> OrchestratorResult<()>;
}

/// Final flat-file output of finalized rows
#[mockall::automock]
#[async_trait]
pub trait OutputWriter: Send + Sync {
    /// Overwrite the output with `rows`; returns the number of rows written
    async fn write_rows(&self, rows: &[CandidateRecord]) -> OrchestratorResult<usize>;
}
