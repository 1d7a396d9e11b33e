//! Command-line and environment configuration
//!
//! Every option reads from a flag or from the environment (a `.env` file is
//! loaded first by `main`). [`Args::into_config`] validates once and yields
//! the immutable [`RunConfig`] the pipeline runs with.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

use fetcher::{SearchQuery, DEFAULT_BASE_URL, DEFAULT_BATCH_SIZE};
use crate::core::{AcceptanceFilter, CANDIDATE_MULTIPLIER};
use crate::error::{OrchestratorError, OrchestratorResult};

/// Which enrichment strategy resolves cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnrichStrategy {
    /// Comma-joined lookups, all-or-nothing per chunk
    Batch,
    /// One lookup per identifier with retries
    Single,
}

/// Resumable company harvester for the api-fns registry
#[derive(Parser, Debug, Clone)]
#[command(name = "harvester")]
#[command(about = "Discovers, enriches and filters companies with a resumable checkpoint")]
pub struct Args {
    /// Registry API key
    #[arg(long, env = "API_FNS_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Registry API root
    #[arg(long, env = "API_FNS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Stop once this many rows are finalized
    #[arg(long, env = "TARGET_COUNT", default_value_t = 200)]
    pub target_count: usize,

    #[arg(long, env = "MIN_EMPLOYEES", default_value_t = 100)]
    pub min_employees: u64,

    #[arg(long, env = "MAX_EMPLOYEES", default_value_t = 500)]
    pub max_employees: u64,

    /// Pause after each upstream call, in seconds
    #[arg(long, env = "SLEEP_SEC", default_value_t = 1.0)]
    pub sleep_sec: f64,

    /// Full-text search query
    #[arg(long, env = "SEARCH_Q", default_value = "it")]
    pub query: String,

    /// Optional search filter expression
    #[arg(long, env = "SEARCH_FILTER")]
    pub filter: Option<String>,

    #[arg(long, env = "MAX_PAGES", default_value_t = 40)]
    pub max_pages: u32,

    /// Identifiers per batch lookup
    #[arg(long, env = "MULTINFO_BATCH", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Accepted activity code prefixes
    #[arg(long, env = "OKVED_PREFIXES", value_delimiter = ',', default_value = "62,63,58")]
    pub okved_prefixes: Vec<String>,

    #[arg(long, env = "ENRICH_STRATEGY", value_enum, default_value_t = EnrichStrategy::Batch)]
    pub strategy: EnrichStrategy,

    /// Checkpoint file
    #[arg(long, env = "PROGRESS_PATH", default_value = "data/progress.json")]
    pub progress_path: PathBuf,

    /// CSV output file
    #[arg(long, env = "OUTPUT_CSV", default_value = "data/companies.csv")]
    pub output_csv: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub api_key: String,
    pub base_url: String,
    pub target_count: usize,
    pub min_employees: u64,
    pub max_employees: u64,
    pub pacing: Duration,
    pub query: String,
    pub filter: Option<String>,
    pub max_pages: u32,
    pub batch_size: usize,
    pub category_prefixes: Vec<String>,
    pub strategy: EnrichStrategy,
    pub progress_path: PathBuf,
    pub output_path: PathBuf,
}

impl Args {
    /// Validate and freeze. Fails before any network call is made.
    pub fn into_config(self) -> OrchestratorResult<RunConfig> {
        let api_key = self
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| OrchestratorError::config("API_FNS_KEY is missing; set it in the environment or .env"))?;

        Url::parse(&self.base_url)
            .map_err(|e| OrchestratorError::config(format!("invalid base URL '{}': {e}", self.base_url)))?;

        if self.target_count == 0 {
            return Err(OrchestratorError::config("target count must be at least 1"));
        }
        if self.min_employees > self.max_employees {
            return Err(OrchestratorError::config(format!(
                "min employees {} exceeds max employees {}",
                self.min_employees, self.max_employees
            )));
        }
        if self.batch_size == 0 {
            return Err(OrchestratorError::config("batch size must be at least 1"));
        }

        let pacing = Duration::try_from_secs_f64(self.sleep_sec)
            .map_err(|_| OrchestratorError::config(format!("invalid pause of {} seconds", self.sleep_sec)))?;

        let category_prefixes: Vec<String> = self
            .okved_prefixes
            .iter()
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .collect();
        if category_prefixes.is_empty() {
            return Err(OrchestratorError::config("at least one activity code prefix is required"));
        }

        Ok(RunConfig {
            api_key,
            base_url: self.base_url,
            target_count: self.target_count,
            min_employees: self.min_employees,
            max_employees: self.max_employees,
            pacing,
            query: self.query,
            filter: self.filter,
            max_pages: self.max_pages,
            batch_size: self.batch_size,
            category_prefixes,
            strategy: self.strategy,
            progress_path: self.progress_path,
            output_path: self.output_csv,
        })
    }
}

impl RunConfig {
    /// Upper bound on candidates sent to enrichment
    pub fn candidate_cap(&self) -> usize {
        self.target_count.saturating_mul(CANDIDATE_MULTIPLIER)
    }

    pub fn acceptance_filter(&self) -> AcceptanceFilter {
        AcceptanceFilter::new(
            self.min_employees,
            self.max_employees,
            self.category_prefixes.clone(),
        )
    }

    pub fn search_query(&self) -> SearchQuery {
        SearchQuery::new(self.query.clone(), self.filter.clone())
    }
}
