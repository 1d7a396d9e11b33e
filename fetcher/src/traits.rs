//! Fetcher trait definitions for dependency injection

use async_trait::async_trait;
use serde_json::Value;

use shared::ApiFailure;
use crate::types::{EnrichmentBatch, SearchQuery};

/// The three upstream registry calls.
///
/// Implementations return the decoded body on success. A body that is not
/// JSON comes back as `Value::String` so callers degrade it to "no items".
#[mockall::automock]
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// One page of full-text company search
    async fn search(&self, query: &SearchQuery) -> Result<Value, ApiFailure>;

    /// Detail cards for a comma-joined identifier list
    async fn lookup_batch(&self, joined_identifiers: &str) -> Result<Value, ApiFailure>;

    /// Registry extract for one identifier
    async fn lookup_one(&self, identifier: &str) -> Result<Value, ApiFailure>;
}

/// Enrichment strategy: identifiers in, cards out.
///
/// Strategies keep their own retry and filter policies; a halted batch still
/// carries every card resolved before the stop.
#[mockall::automock]
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Suffix appended to the search source tag of merged rows
    fn source_tag(&self) -> &'static str;

    async fn enrich(&self, identifiers: &[String]) -> EnrichmentBatch;
}
