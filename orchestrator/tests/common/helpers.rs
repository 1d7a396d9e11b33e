//! Test helpers and builder patterns for orchestrator tests

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use fetcher::{BatchEnricher, MockUpstreamApi, Pacing, SearchSource, SingleItemEnricher};
use orchestrator::{
    CsvOutputWriter, JsonProgressStore, MockOutputWriter, MockProgressStore, Orchestrator, OutputWriter, ProgressStore,
    RunConfig,
};
use shared::{ApiFailure, ProgressState};
use super::fixtures::{FakeCompany, TestFixtures};

/// Serve search pages of `TestFixtures::PAGE_SIZE` hits; pages past the end
/// are empty
pub fn search_page(companies: &[FakeCompany], page: u32) -> Value {
    let start = (page as usize - 1) * TestFixtures::PAGE_SIZE;
    let items: Vec<Value> = companies
        .iter()
        .skip(start)
        .take(TestFixtures::PAGE_SIZE)
        .map(FakeCompany::search_item)
        .collect();
    json!({"items": items})
}

/// Answer a `/multinfo` request with the cards the registry knows
pub fn multinfo_response(companies: &HashMap<String, FakeCompany>, joined: &str) -> Value {
    let items: Vec<Value> = joined
        .split(',')
        .filter_map(|inn| companies.get(inn))
        .map(FakeCompany::card_item)
        .collect();
    json!({"items": items})
}

/// Builder for orchestrators running against a fake registry
pub struct OrchestratorBuilder {
    config: RunConfig,
    api: MockUpstreamApi,
    companies: Vec<FakeCompany>,
}

impl OrchestratorBuilder {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            api: MockUpstreamApi::new(),
            companies: Vec::new(),
        }
    }

    pub fn with_target(mut self, target_count: usize) -> Self {
        self.config.target_count = target_count;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Serve search pages from `companies`
    pub fn with_search(mut self, companies: Vec<FakeCompany>) -> Self {
        self.companies = companies;
        let pages = self.companies.clone();
        self.api
            .expect_search()
            .returning(move |query| Ok(search_page(&pages, query.page)));
        self
    }

    /// Serve search and every lookup from `companies`
    pub fn with_registry(self, companies: Vec<FakeCompany>) -> Self {
        let mut builder = self.with_search(companies);

        let by_inn: HashMap<String, FakeCompany> = builder
            .companies
            .iter()
            .map(|company| (company.inn.clone(), company.clone()))
            .collect();
        let for_batch = by_inn.clone();
        builder
            .api
            .expect_lookup_batch()
            .returning(move |joined| Ok(multinfo_response(&for_batch, joined)));
        builder.api.expect_lookup_one().returning(move |inn| {
            Ok(by_inn
                .get(inn)
                .map(FakeCompany::detail_item)
                .unwrap_or_else(|| json!({})))
        });
        builder
    }

    /// Adjust the upstream mock directly
    pub fn with_api<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockUpstreamApi),
    {
        setup(&mut self.api);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Batch strategy with the given storage services
    pub fn build<S, W>(self, store: S, output: W) -> Orchestrator<MockUpstreamApi, BatchEnricher<MockUpstreamApi>, S, W>
    where
        S: ProgressStore,
        W: OutputWriter,
    {
        let api = Arc::new(self.api);
        let search = SearchSource::new(Arc::clone(&api), Pacing::none());
        let enricher = BatchEnricher::new(api, self.config.batch_size, Pacing::none());
        Orchestrator::new(self.config, search, enricher, store, output)
    }

    /// Batch strategy persisting to the configured paths
    pub fn build_on_disk(self) -> Orchestrator<MockUpstreamApi, BatchEnricher<MockUpstreamApi>, JsonProgressStore, CsvOutputWriter> {
        let store = JsonProgressStore::new(self.config.progress_path.clone());
        let output = CsvOutputWriter::new(self.config.output_path.clone());
        self.build(store, output)
    }

    /// Single-identifier strategy persisting to the configured paths
    pub fn build_single_on_disk(
        self,
    ) -> Orchestrator<MockUpstreamApi, SingleItemEnricher<MockUpstreamApi>, JsonProgressStore, CsvOutputWriter> {
        let api = Arc::new(self.api);
        let search = SearchSource::new(Arc::clone(&api), Pacing::none());
        let enricher = SingleItemEnricher::new(api, Pacing::none());
        let store = JsonProgressStore::new(self.config.progress_path.clone());
        let output = CsvOutputWriter::new(self.config.output_path.clone());
        Orchestrator::new(self.config, search, enricher, store, output)
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Progress store mock that loads `initial` once; saves are left to the test
    pub fn store_loading(initial: ProgressState) -> MockProgressStore {
        let mut store = MockProgressStore::new();
        store.expect_load().times(1).return_const(initial);
        store
    }

    /// Like [`TestHelpers::store_loading`], accepting any number of saves
    pub fn store_loading_any_save(initial: ProgressState) -> MockProgressStore {
        let mut store = Self::store_loading(initial);
        store.expect_save().returning(|_| Ok(()));
        store
    }

    /// Output mock that accepts one write
    pub fn output_accepting() -> MockOutputWriter {
        let mut output = MockOutputWriter::new();
        output.expect_write_rows().times(1).returning(|rows| Ok(rows.len()));
        output
    }

    /// Output mock that must never be written
    pub fn output_untouched() -> MockOutputWriter {
        let mut output = MockOutputWriter::new();
        output.expect_write_rows().times(0);
        output
    }

    pub fn state_with(rows: &[&str]) -> ProgressState {
        let mut state = ProgressState::new();
        for inn in rows {
            state.finalize(TestFixtures::finalized_row(inn));
        }
        state
    }

    /// Every finalized row satisfies the acceptance filter of `config`
    pub fn assert_filter_sound(config: &RunConfig, state: &ProgressState) {
        let filter = config.acceptance_filter();
        for row in state.rows() {
            assert!(filter.accepts(row), "row {} violates the filter: {row:?}", row.identifier);
        }
    }

    /// seen holds exactly the row identifiers, each row once
    pub fn assert_seen_matches_rows(state: &ProgressState) {
        let identifiers: Vec<&str> = state.rows().iter().map(|row| row.identifier.as_str()).collect();
        let unique: std::collections::BTreeSet<&str> = identifiers.iter().copied().collect();
        assert_eq!(unique.len(), identifiers.len(), "duplicate rows");
        assert_eq!(state.seen_count(), identifiers.len());
        assert!(identifiers.iter().all(|inn| state.is_seen(inn)));
    }

    pub fn quota_failure() -> ApiFailure {
        ApiFailure::PaymentRequired
    }
}
