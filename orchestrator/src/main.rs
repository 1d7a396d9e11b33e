//! Main entry point for the harvester binary
//!
//! Loads `.env`, parses configuration, wires the real services and runs the
//! pipeline once. A fatal run error exits non-zero after the checkpoint has
//! been saved.

use std::sync::Arc;

use clap::Parser;

use fetcher::{BatchEnricher, Enricher, Pacing, RealUpstreamApi, SearchSource, SingleItemEnricher};
use orchestrator::{
    Args, CsvOutputWriter, EnrichStrategy, JsonProgressStore, Orchestrator, OrchestratorResult, RunConfig, RunSummary,
};
use shared::{logging, stage_debug, Stage};

#[tokio::main]
async fn main() -> OrchestratorResult<()> {
    // .env is optional
    let _ = dotenv::dotenv();

    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let config = args.into_config().map_err(|e| {
        logging::log_error(Stage::Run, "Configuration", &e);
        e
    })?;

    logging::log_startup(
        Stage::Run,
        &format!(
            "harvester: target={} employees={}..={} query='{}' strategy={:?}",
            config.target_count, config.min_employees, config.max_employees, config.query, config.strategy
        ),
    );
    stage_debug!(
        Stage::Run,
        max_pages = config.max_pages,
        batch_size = config.batch_size,
        pause_ms = config.pacing.as_millis() as u64,
        filter = config.filter.as_deref().unwrap_or("(none)"),
        "Run parameters"
    );

    let api = Arc::new(RealUpstreamApi::new(&config.base_url, config.api_key.clone())?);
    let pacing = Pacing::new(config.pacing);

    let outcome = match config.strategy {
        EnrichStrategy::Batch => {
            let enricher = BatchEnricher::new(Arc::clone(&api), config.batch_size, pacing);
            run_pipeline(config, api, enricher, pacing).await
        }
        EnrichStrategy::Single => {
            let enricher = SingleItemEnricher::new(Arc::clone(&api), pacing);
            run_pipeline(config, api, enricher, pacing).await
        }
    };
    let summary = outcome.map_err(|e| {
        logging::log_shutdown(Stage::Run, "run aborted, re-run to resume from the checkpoint");
        e
    })?;

    logging::log_success(
        Stage::Output,
        &format!(
            "done: rows={} added={} (loaded {}, discovered {}, enriched {})",
            summary.final_rows, summary.rows_added, summary.rows_loaded, summary.discovered, summary.cards_resolved
        ),
    );
    Ok(())
}

async fn run_pipeline<E: Enricher>(
    config: RunConfig,
    api: Arc<RealUpstreamApi>,
    enricher: E,
    pacing: Pacing,
) -> OrchestratorResult<RunSummary> {
    let search = SearchSource::new(api, pacing);
    let store = JsonProgressStore::new(config.progress_path.clone());
    let output = CsvOutputWriter::new(config.output_path.clone());

    let orchestrator = Orchestrator::new(config, search, enricher, store, output);
    orchestrator.run().await
}
