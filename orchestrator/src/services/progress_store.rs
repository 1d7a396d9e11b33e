//! JSON checkpoint on the local file system
//!
//! Saves go to a sibling `.tmp` file that is renamed over the checkpoint, so
//! a crash mid-write leaves the previous checkpoint in place.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use shared::extract::text_of;
use shared::{stage_debug, stage_info, stage_warn, CandidateRecord, ProgressState, Stage};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::ProgressStore;

/// Checkpoint stored as pretty-printed UTF-8 JSON
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "progress.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn checkpoint_error(&self, path: &Path, source: std::io::Error) -> OrchestratorError {
        OrchestratorError::CheckpointError {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Decode checkpoint text and reconcile rows with the seen-set.
///
/// Only text that is not a JSON object fails. A missing or mistyped
/// `seen_inn`/`rows` reads as empty, and rows are decoded one at a time: a
/// row that is not an object or lacks an identifier is dropped and counted
/// as a repair, while the rest of the checkpoint survives.
pub fn decode_checkpoint(text: &str) -> OrchestratorResult<(ProgressState, usize)> {
    let document: Value = serde_json::from_str(text)?;
    let fields = document
        .as_object()
        .ok_or_else(|| OrchestratorError::CorruptCheckpoint {
            message: "top level is not a JSON object".to_string(),
        })?;

    let seen: BTreeSet<String> = fields
        .get("seen_inn")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(text_of)
                .filter(|identifier| !identifier.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let mut dropped = 0;
    let mut rows = Vec::new();
    for raw in fields.get("rows").and_then(Value::as_array).into_iter().flatten() {
        match serde_json::from_value::<CandidateRecord>(raw.clone()) {
            Ok(row) if !row.identifier.is_empty() => rows.push(row),
            _ => dropped += 1,
        }
    }

    let (state, repairs) = ProgressState::from_parts(seen, rows);
    Ok((state, repairs + dropped))
}

#[async_trait]
impl ProgressStore for JsonProgressStore {
    async fn load(&self) -> ProgressState {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                stage_info!(Stage::Checkpoint, "No checkpoint at {}, starting fresh", self.path.display());
                return ProgressState::new();
            }
            Err(e) => {
                stage_warn!(Stage::Checkpoint, "Unreadable checkpoint {}: {}; starting fresh", self.path.display(), e);
                return ProgressState::new();
            }
        };

        match decode_checkpoint(&text) {
            Ok((state, repairs)) => {
                if repairs > 0 {
                    stage_warn!(Stage::Checkpoint, repairs, "Checkpoint rows and seen-set disagreed; reconciled");
                }
                stage_info!(
                    Stage::Checkpoint,
                    rows = state.row_count(),
                    seen = state.seen_count(),
                    "Loaded checkpoint"
                );
                state
            }
            Err(e) => {
                stage_warn!(Stage::Checkpoint, "Corrupt checkpoint {}: {}; starting fresh", self.path.display(), e);
                ProgressState::new()
            }
        }
    }

    async fn save(&self, state: &ProgressState) -> OrchestratorResult<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.checkpoint_error(parent, e))?;
        }

        let content = serde_json::to_string_pretty(state)?;
        let temp_path = self.temp_path();

        fs::write(&temp_path, content)
            .await
            .map_err(|e| self.checkpoint_error(&temp_path, e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.checkpoint_error(&self.path, e))?;

        stage_debug!(
            Stage::Checkpoint,
            rows = state.row_count(),
            seen = state.seen_count(),
            "💾 Checkpoint saved to {}",
            self.path.display()
        );
        Ok(())
    }
}
