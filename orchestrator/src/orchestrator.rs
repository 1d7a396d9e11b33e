//! Main orchestrator implementation
//!
//! Owns the progress state for the length of one run and drives
//! discovery, gating, enrichment, merging and persistence strictly in
//! sequence. Whatever happens, the state is saved before `run` returns.

use tracing::Instrument;
use uuid::Uuid;

use fetcher::{Enricher, SearchSource, UpstreamApi};
use shared::{logging, stage_debug, stage_info, stage_warn, ProgressState, Stage};

use crate::config::RunConfig;
use crate::core::{gate_candidates, MergeDecision, Merger};
use crate::error::OrchestratorResult;
use crate::traits::{OutputWriter, ProgressStore};

/// Acceptances between intermediate checkpoints
pub const CHECKPOINT_EVERY: usize = 10;

/// Counters reported by a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub discovered: usize,
    pub gated: usize,
    pub cards_resolved: usize,
    pub rows_added: usize,
    pub final_rows: usize,
    pub enrichment_halted: bool,
}

/// Resumable enrichment pipeline over injected services
pub struct Orchestrator<A, E, S, W>
where
    A: UpstreamApi,
    E: Enricher,
    S: ProgressStore,
    W: OutputWriter,
{
    config: RunConfig,
    search: SearchSource<A>,
    enricher: E,
    store: S,
    output: W,
}

impl<A, E, S, W> Orchestrator<A, E, S, W>
where
    A: UpstreamApi,
    E: Enricher,
    S: ProgressStore,
    W: OutputWriter,
{
    pub fn new(config: RunConfig, search: SearchSource<A>, enricher: E, store: S, output: W) -> Self {
        Self {
            config,
            search,
            enricher,
            store,
            output,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute one full run inside a span carrying a fresh run id.
    ///
    /// On success the final checkpoint and the CSV output are written. On a
    /// fatal error the checkpoint is still saved (best effort) and the error
    /// is returned; the output file is left untouched.
    pub async fn run(&self) -> OrchestratorResult<RunSummary> {
        let span = tracing::info_span!("run", run_id = %Uuid::new_v4());
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> OrchestratorResult<RunSummary> {
        let mut state = self.store.load().await;
        let mut summary = RunSummary {
            rows_loaded: state.row_count(),
            ..RunSummary::default()
        };
        logging::log_progress(
            Stage::Run,
            "Loaded progress",
            &format!("rows={} seen={}", state.row_count(), state.seen_count()),
        );

        if let Err(error) = self.collect(&mut state, &mut summary).await {
            logging::log_error(Stage::Run, "Run", &error);
            if let Err(save_error) = self.store.save(&state).await {
                logging::log_error(Stage::Checkpoint, "Final checkpoint", &save_error);
            }
            return Err(error);
        }

        self.store.save(&state).await?;
        self.output.write_rows(state.rows()).await?;

        summary.final_rows = state.row_count();
        logging::log_success(
            Stage::Run,
            &format!("rows={} added={}", summary.final_rows, summary.rows_added),
        );
        Ok(summary)
    }

    async fn collect(&self, state: &mut ProgressState, summary: &mut RunSummary) -> OrchestratorResult<()> {
        let target = self.config.target_count;
        if state.row_count() >= target {
            stage_info!(Stage::Run, target_count = target, "Target already reached, nothing to collect");
            return Ok(());
        }

        let discovered = self
            .search
            .discover(&self.config.search_query(), self.config.max_pages)
            .await?;
        summary.discovered = discovered.len();
        stage_info!(Stage::Search, "Discovered {} candidates", discovered.len());

        let gated = gate_candidates(discovered, state, self.config.candidate_cap());
        summary.gated = gated.len();
        stage_info!(
            Stage::Gate,
            already_seen = gated.stats.already_seen,
            duplicates = gated.stats.duplicates,
            over_cap = gated.stats.over_cap,
            "{} candidates to enrich",
            gated.len()
        );
        if gated.is_empty() {
            return Ok(());
        }

        let batch = self.enricher.enrich(&gated.identifiers()).await;
        summary.cards_resolved = batch.len();
        if let Some(failure) = &batch.halted {
            summary.enrichment_halted = true;
            stage_warn!(Stage::Enrich, "Enrichment stopped early: {}; merging {} cards", failure, batch.len());
        }

        let merger = Merger::new(self.config.acceptance_filter(), self.enricher.source_tag());
        for candidate in gated.candidates {
            if state.row_count() >= target {
                break;
            }

            let identifier = candidate.identifier.clone();
            match merger.merge(candidate, batch.get(&identifier)) {
                MergeDecision::Accepted(record) => {
                    if !state.finalize(record) {
                        continue;
                    }
                    summary.rows_added += 1;
                    if summary.rows_added % CHECKPOINT_EVERY == 0 {
                        self.store.save(state).await?;
                        logging::log_progress(
                            Stage::Checkpoint,
                            "Checkpoint",
                            &format!("rows={} added={}", state.row_count(), summary.rows_added),
                        );
                    }
                }
                MergeDecision::NoCard => {
                    stage_debug!(Stage::Merge, identifier = %identifier, "No card resolved");
                }
                MergeDecision::Rejected(rejection) => {
                    stage_debug!(Stage::Merge, identifier = %identifier, "Rejected: {:?}", rejection);
                }
            }
        }

        stage_info!(
            Stage::Merge,
            rows = state.row_count(),
            added = summary.rows_added,
            "Merge and filter complete"
        );
        Ok(())
    }
}
