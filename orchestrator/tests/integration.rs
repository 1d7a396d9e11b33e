//! End-to-end pipeline tests against a fake registry
//!
//! Upstream calls are served by `MockUpstreamApi`; storage is either the real
//! JSON/CSV services in a temporary directory or mockall mocks when call
//! counts matter.

use std::collections::HashMap;
use std::sync::Arc;

use fetcher::{EnrichmentBatch, FetchError, MockEnricher, MockUpstreamApi, Pacing, SearchSource};
use orchestrator::{JsonProgressStore, MockProgressStore, Orchestrator, OrchestratorError, ProgressStore};
use shared::{ApiFailure, EnrichmentCard, ProgressState};
use tempfile::TempDir;

mod common;
use common::{FakeCompany, OrchestratorBuilder, TestFixtures, TestHelpers};

fn accepted_identifiers(state: &ProgressState) -> Vec<&str> {
    state.rows().iter().map(|row| row.identifier.as_str()).collect()
}

#[tokio::test]
async fn test_full_run_writes_checkpoint_and_csv() {
    let dir = TempDir::new().unwrap();
    let orchestrator = OrchestratorBuilder::new(TestFixtures::config(dir.path()))
        .with_registry(TestFixtures::mixed_registry())
        .build_on_disk();
    let config = orchestrator.config().clone();

    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.rows_loaded, 0);
    assert_eq!(summary.discovered, 10);
    assert_eq!(summary.gated, 10);
    assert_eq!(summary.cards_resolved, 10);
    assert_eq!(summary.rows_added, 6);
    assert_eq!(summary.final_rows, 6);
    assert!(!summary.enrichment_halted);

    let state = JsonProgressStore::new(&config.progress_path).load().await;
    assert_eq!(accepted_identifiers(&state), TestFixtures::mixed_registry_accepted());
    TestHelpers::assert_filter_sound(&config, &state);
    TestHelpers::assert_seen_matches_rows(&state);

    let first = &state.rows()[0];
    assert_eq!(first.source, "api-fns/search+multinfo");
    assert_eq!(first.revenue_year, "2023");
    assert_eq!(first.revenue_amount, "1500000");
    assert_eq!(first.name, "ООО Тест 7700000001");

    let csv = std::fs::read_to_string(&config.output_path).unwrap();
    assert!(csv.starts_with('\u{feff}'));
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[1].starts_with("7700000001;ООО Тест 7700000001;150;62.01;api-fns/search+multinfo;"));
    assert!(lines[1].contains(";info@7700000001.ru;84957700000001;"));
}

#[tokio::test]
async fn test_repeated_runs_are_monotonic() {
    let dir = TempDir::new().unwrap();
    let registry = TestFixtures::acceptable_registry(9);

    let mut seen_counts = Vec::new();
    for target in [3, 6, 50, 50] {
        let config = TestFixtures::config(dir.path());
        let orchestrator = OrchestratorBuilder::new(config.clone())
            .with_target(target)
            .with_registry(registry.clone())
            .build_on_disk();
        orchestrator.run().await.unwrap();

        let state = JsonProgressStore::new(&config.progress_path).load().await;
        TestHelpers::assert_seen_matches_rows(&state);
        TestHelpers::assert_filter_sound(&config, &state);
        seen_counts.push(state.seen_count());
    }

    assert_eq!(seen_counts, vec![3, 6, 9, 9]);
}

#[tokio::test]
async fn test_resume_skips_finalized_identifiers() {
    let dir = TempDir::new().unwrap();
    let registry = TestFixtures::acceptable_registry(4);
    let config = TestFixtures::config(dir.path());

    let store = JsonProgressStore::new(&config.progress_path);
    store
        .save(&TestHelpers::state_with(&[&registry[0].inn, &registry[2].inn]))
        .await
        .unwrap();

    let summary = OrchestratorBuilder::new(config.clone())
        .with_registry(registry.clone())
        .build_on_disk()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.rows_loaded, 2);
    assert_eq!(summary.gated, 2);
    assert_eq!(summary.rows_added, 2);

    let state = store.load().await;
    assert_eq!(
        accepted_identifiers(&state),
        vec![
            registry[0].inn.as_str(),
            registry[2].inn.as_str(),
            registry[1].inn.as_str(),
            registry[3].inn.as_str(),
        ]
    );
    // rows from the earlier run are kept verbatim
    assert_eq!(state.rows()[0].name, format!("ООО Ранее {}", registry[0].inn));
}

#[tokio::test]
async fn test_target_stops_acceptance() {
    let dir = TempDir::new().unwrap();
    let summary = OrchestratorBuilder::new(TestFixtures::config(dir.path()))
        .with_target(2)
        .with_registry(TestFixtures::acceptable_registry(8))
        .build(TestHelpers::store_loading_any_save(ProgressState::new()), TestHelpers::output_accepting())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.gated, 8, "cap is target x 5");
    assert_eq!(summary.rows_added, 2);
    assert_eq!(summary.final_rows, 2);
}

#[tokio::test]
async fn test_candidate_cap_bounds_enrichment() {
    let dir = TempDir::new().unwrap();
    let summary = OrchestratorBuilder::new(TestFixtures::config(dir.path()))
        .with_target(1)
        .with_registry(TestFixtures::acceptable_registry(12))
        .build(TestHelpers::store_loading_any_save(ProgressState::new()), TestHelpers::output_accepting())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.discovered, 12);
    assert_eq!(summary.gated, 5);
    assert_eq!(summary.cards_resolved, 5);
}

#[tokio::test]
async fn test_checkpoint_every_ten_acceptances_and_at_end() {
    let dir = TempDir::new().unwrap();

    let mut store = TestHelpers::store_loading(ProgressState::new());
    let mut sequence = mockall::Sequence::new();
    for rows in [10usize, 20, 23] {
        store
            .expect_save()
            .times(1)
            .in_sequence(&mut sequence)
            .withf(move |state| state.row_count() == rows)
            .returning(|_| Ok(()));
    }

    let summary = OrchestratorBuilder::new(TestFixtures::config(dir.path()))
        .with_registry(TestFixtures::acceptable_registry(23))
        .build(store, TestHelpers::output_accepting())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.rows_added, 23);
}

#[tokio::test]
async fn test_fatal_search_error_keeps_checkpoint_and_skips_output() {
    let dir = TempDir::new().unwrap();
    let config = TestFixtures::config(dir.path());
    let store = JsonProgressStore::new(&config.progress_path);
    let preloaded = TestHelpers::state_with(&["1111111111"]);
    store.save(&preloaded).await.unwrap();

    let error = OrchestratorBuilder::new(config.clone())
        .with_api(|api| {
            api.expect_search()
                .times(1)
                .returning(|_| Err(TestHelpers::quota_failure()));
        })
        .build_on_disk()
        .run()
        .await
        .unwrap_err();

    assert!(error.is_quota_exhausted());
    assert!(matches!(
        error,
        OrchestratorError::FetchError(FetchError::QuotaExhausted { .. })
    ));
    assert_eq!(store.load().await, preloaded);
    assert!(!config.output_path.exists(), "no CSV after a fatal run");
}

#[tokio::test]
async fn test_fatal_abort_saves_loaded_rows() {
    let dir = TempDir::new().unwrap();
    let preloaded = TestHelpers::state_with(&["1111111111", "2222222222"]);

    let mut store = TestHelpers::store_loading(preloaded.clone());
    store
        .expect_save()
        .times(1)
        .withf(move |state| *state == preloaded)
        .returning(|_| Ok(()));

    let result = OrchestratorBuilder::new(TestFixtures::config(dir.path()))
        .with_api(|api| {
            api.expect_search()
                .withf(|query| query.page == 1)
                .times(1)
                .returning(|_| Ok(serde_json::json!({"items": [{"ИНН": "3333333333"}]})));
            api.expect_search()
                .withf(|query| query.page == 2)
                .times(1)
                .returning(|_| Err(ApiFailure::from_status(500, "oops")));
        })
        .build(store, TestHelpers::output_untouched())
        .run()
        .await;

    match result {
        Err(OrchestratorError::FetchError(FetchError::PageFailed { page, .. })) => assert_eq!(page, 2),
        other => panic!("expected page failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_enrichment_halt_merges_partial_cards() {
    let dir = TempDir::new().unwrap();
    let registry = TestFixtures::acceptable_registry(6);
    let first_chunk: Vec<FakeCompany> = registry[..3].to_vec();

    let summary = OrchestratorBuilder::new(TestFixtures::config(dir.path()))
        .with_batch_size(3)
        .with_search(registry)
        .with_api(move |api| {
            let known: std::collections::HashMap<String, FakeCompany> =
                first_chunk.iter().map(|c| (c.inn.clone(), c.clone())).collect();
            api.expect_lookup_batch().returning(move |joined| {
                if joined.split(',').all(|inn| known.contains_key(inn)) {
                    Ok(common::helpers::multinfo_response(&known, joined))
                } else {
                    Err(ApiFailure::RateLimited)
                }
            });
        })
        .build(TestHelpers::store_loading_any_save(ProgressState::new()), TestHelpers::output_accepting())
        .run()
        .await
        .unwrap();

    assert!(summary.enrichment_halted);
    assert_eq!(summary.cards_resolved, 3);
    assert_eq!(summary.rows_added, 3);
}

#[tokio::test]
async fn test_candidates_without_card_stay_eligible() {
    let dir = TempDir::new().unwrap();
    let config = TestFixtures::config(dir.path());
    let registry = TestFixtures::acceptable_registry(2);

    OrchestratorBuilder::new(config.clone())
        .with_search(registry.clone())
        .with_api(|api| {
            api.expect_lookup_batch()
                .returning(|_| Ok(serde_json::json!({"items": []})));
        })
        .build_on_disk()
        .run()
        .await
        .unwrap();

    let state = JsonProgressStore::new(&config.progress_path).load().await;
    assert_eq!(state.seen_count(), 0);

    let summary = OrchestratorBuilder::new(config)
        .with_registry(registry)
        .build_on_disk()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.rows_added, 2);
}

#[tokio::test]
async fn test_single_strategy_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = TestFixtures::config(dir.path());
    let registry = vec![
        FakeCompany::new("7800000001", 99, "62.01"),
        FakeCompany::new("7800000002", 150, "62.01").in_region("Казань"),
        FakeCompany::new("7800000003", 700, "62.01"),
    ];

    let summary = OrchestratorBuilder::new(config.clone())
        .with_registry(registry)
        .build_single_on_disk()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.cards_resolved, 2, "below-floor record discarded early");
    assert_eq!(summary.rows_added, 1, "700 employees exceeds the max");

    let state = JsonProgressStore::new(&config.progress_path).load().await;
    let row = &state.rows()[0];
    assert_eq!(row.identifier, "7800000002");
    assert_eq!(row.source, "api-fns/search+egr");
    assert_eq!(row.contacts, "84957800000002");
}

#[tokio::test]
async fn test_target_already_reached_skips_upstream() {
    let dir = TempDir::new().unwrap();
    let preloaded = TestHelpers::state_with(&["1", "2", "3"]);

    // no upstream expectations: any call would panic
    let summary = OrchestratorBuilder::new(TestFixtures::config(dir.path()))
        .with_target(3)
        .build(TestHelpers::store_loading_any_save(preloaded), TestHelpers::output_accepting())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.rows_loaded, 3);
    assert_eq!(summary.final_rows, 3);
    assert_eq!(summary.discovered, 0);
}

#[tokio::test]
async fn test_failed_final_save_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let mut store: MockProgressStore = TestHelpers::store_loading(ProgressState::new());
    store.expect_save().returning(|_| {
        Err(OrchestratorError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    });

    let result = OrchestratorBuilder::new(TestFixtures::config(dir.path()))
        .with_registry(TestFixtures::acceptable_registry(1))
        .build(store, TestHelpers::output_untouched())
        .run()
        .await;

    assert!(matches!(result, Err(OrchestratorError::IoError(_))));
}

#[tokio::test]
async fn test_any_enricher_feeds_the_merge() {
    let dir = TempDir::new().unwrap();
    let config = TestFixtures::config(dir.path());
    let registry = TestFixtures::acceptable_registry(3);

    let mut api = MockUpstreamApi::new();
    let pages = registry.clone();
    api.expect_search()
        .returning(move |query| Ok(common::helpers::search_page(&pages, query.page)));

    let expected: Vec<String> = registry.iter().map(|company| company.inn.clone()).collect();
    let mut enricher = MockEnricher::new();
    enricher.expect_source_tag().return_const("registry");
    enricher
        .expect_enrich()
        .times(1)
        .withf(move |identifiers: &[String]| identifiers == expected.as_slice())
        .returning(|identifiers| {
            // only the middle identifier resolves
            let card = EnrichmentCard {
                identifier: identifiers[1].clone(),
                employees: 250,
                category_code: "63.11".to_string(),
                ..EnrichmentCard::default()
            };
            EnrichmentBatch {
                cards: HashMap::from([(card.identifier.clone(), card)]),
                halted: None,
            }
        });

    let orchestrator = Orchestrator::new(
        config,
        SearchSource::new(Arc::new(api), Pacing::none()),
        enricher,
        TestHelpers::store_loading_any_save(ProgressState::new()),
        TestHelpers::output_accepting(),
    );
    let summary = orchestrator.run().await.unwrap();

    assert_eq!(summary.cards_resolved, 1);
    assert_eq!(summary.rows_added, 1);
}

