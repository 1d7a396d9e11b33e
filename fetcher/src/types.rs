//! Fetcher-specific data types

use std::collections::HashMap;
use std::time::Duration;

use shared::{ApiFailure, CandidateRecord, EnrichmentCard};

/// One page request against the search endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub filter: Option<String>,
    pub page: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, filter: Option<String>) -> Self {
        Self {
            query: query.into(),
            filter: filter.filter(|f| !f.trim().is_empty()),
            page: 1,
        }
    }

    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Cards resolved by one enrichment pass, possibly cut short
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentBatch {
    pub cards: HashMap<String, EnrichmentCard>,
    /// Failure that stopped the pass before every identifier was tried
    pub halted: Option<ApiFailure>,
}

impl EnrichmentBatch {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&EnrichmentCard> {
        self.cards.get(identifier)
    }
}

/// Result of the per-identifier strategy over a list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SingleEnrichment {
    pub records: Vec<CandidateRecord>,
    pub halted: Option<ApiFailure>,
}

/// What happened to one identifier in the per-identifier strategy
#[derive(Debug, Clone, PartialEq)]
pub enum SingleOutcome {
    Record(CandidateRecord),
    /// Fetched, but below the employee floor
    BelowFloor { employees: u64 },
    /// No usable response within the attempt cap
    Exhausted { last_failure: Option<ApiFailure> },
    /// Auth or quota failure; the whole pass must stop
    Halted(ApiFailure),
}

/// Inter-call delays that keep the run under upstream rate limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After every call (or identifier)
    pub delay: Duration,
    /// Extra pause every `cooldown_every` identifiers
    pub cooldown: Duration,
    pub cooldown_every: usize,
}

impl Pacing {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// No waiting at all; for tests and dry runs
    pub fn none() -> Self {
        Self {
            delay: Duration::ZERO,
            cooldown: Duration::ZERO,
            cooldown_every: 5,
        }
    }

    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Cooldown due after `processed` identifiers
    pub fn cooldown_due(&self, processed: usize) -> bool {
        self.cooldown_every > 0 && processed > 0 && processed % self.cooldown_every == 0
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            cooldown: Duration::from_secs(5),
            cooldown_every: 5,
        }
    }
}

/// Retry schedule of the per-identifier strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Backoff after attempt `n` is `backoff_step * n`
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
        }
    }
}
