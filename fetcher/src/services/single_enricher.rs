//! Per-identifier enrichment with retries and an early employee filter

use std::sync::Arc;

use async_trait::async_trait;

use shared::{stage_debug, stage_info, stage_warn, ApiFailure, EnrichmentCard, Stage};
use crate::core::parse_detail;
use crate::traits::{Enricher, UpstreamApi};
use crate::types::{EnrichmentBatch, Pacing, RetryPolicy, SingleEnrichment, SingleOutcome};

/// Records below this many employees are dropped right after the fetch
pub const EARLY_EMPLOYEE_FLOOR: u64 = 100;

/// Fetches one registry extract per identifier.
///
/// Each identifier gets up to `retry.max_attempts` tries with linear backoff.
/// An auth or quota refusal stops the whole pass; anything else is retried
/// and then skipped.
pub struct SingleItemEnricher<A: UpstreamApi> {
    api: Arc<A>,
    retry: RetryPolicy,
    pacing: Pacing,
    employee_floor: u64,
}

impl<A: UpstreamApi> SingleItemEnricher<A> {
    pub fn new(api: Arc<A>, pacing: Pacing) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
            pacing,
            employee_floor: EARLY_EMPLOYEE_FLOOR,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch, parse and pre-filter one identifier
    pub async fn enrich_one(&self, identifier: &str) -> SingleOutcome {
        let mut last_failure = None;

        for attempt in 1..=self.retry.max_attempts {
            match self.api.lookup_one(identifier).await {
                Ok(payload) => {
                    // an empty extract will not improve on retry
                    let Some(record) = parse_detail(identifier, &payload) else {
                        return SingleOutcome::Exhausted { last_failure: None };
                    };
                    if record.employees < self.employee_floor {
                        return SingleOutcome::BelowFloor {
                            employees: record.employees,
                        };
                    }
                    return SingleOutcome::Record(record);
                }
                Err(failure) if failure.is_auth_or_quota() => {
                    stage_warn!(Stage::Enrich, identifier, "Lookup refused, stopping enrichment: {}", failure);
                    return SingleOutcome::Halted(failure);
                }
                Err(failure) => {
                    stage_debug!(Stage::Enrich, identifier, attempt, "Lookup failed: {}", failure);
                    last_failure = Some(failure);
                    self.backoff(attempt).await;
                }
            }
        }

        SingleOutcome::Exhausted { last_failure }
    }

    /// Run [`Self::enrich_one`] over every identifier in order, pacing
    /// between identifiers and cooling down every few of them
    pub async fn enrich_records(&self, identifiers: &[String]) -> SingleEnrichment {
        let mut result = SingleEnrichment::default();

        for (index, identifier) in identifiers.iter().enumerate() {
            match self.enrich_one(identifier).await {
                SingleOutcome::Record(record) => result.records.push(record),
                SingleOutcome::BelowFloor { employees } => {
                    stage_debug!(Stage::Enrich, identifier = %identifier, employees, "Below employee floor");
                }
                SingleOutcome::Exhausted { last_failure } => {
                    stage_warn!(
                        Stage::Enrich,
                        identifier = %identifier,
                        "Skipping identifier: {}",
                        describe_failure(last_failure.as_ref())
                    );
                }
                SingleOutcome::Halted(failure) => {
                    result.halted = Some(failure);
                    break;
                }
            }

            self.pacing.pause().await;
            if self.pacing.cooldown_due(index + 1) {
                tokio::time::sleep(self.pacing.cooldown).await;
            }
        }

        stage_info!(Stage::Enrich, "Resolved {} records individually", result.records.len());
        result
    }

    async fn backoff(&self, attempt: u32) {
        if attempt < self.retry.max_attempts {
            tokio::time::sleep(self.retry.backoff_after(attempt)).await;
        }
    }
}

#[async_trait]
impl<A: UpstreamApi> Enricher for SingleItemEnricher<A> {
    fn source_tag(&self) -> &'static str {
        "egr"
    }

    async fn enrich(&self, identifiers: &[String]) -> EnrichmentBatch {
        let SingleEnrichment { records, halted } = self.enrich_records(identifiers).await;
        let cards = records
            .iter()
            .map(|record| (record.identifier.clone(), EnrichmentCard::from(record)))
            .collect();
        EnrichmentBatch { cards, halted }
    }
}

fn describe_failure(failure: Option<&ApiFailure>) -> String {
    failure.map_or_else(|| "no usable data".to_string(), ToString::to_string)
}
