//! Chunked batch enrichment

use std::sync::Arc;

use async_trait::async_trait;

use shared::{stage_debug, stage_info, stage_warn, Stage};
use crate::core::{chunk_identifiers, parse_batch_cards};
use crate::traits::{Enricher, UpstreamApi};
use crate::types::{EnrichmentBatch, Pacing};

/// Default identifiers per lookup call
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Resolves cards one comma-joined chunk at a time.
///
/// The first failed chunk ends the pass; cards from earlier chunks are kept
/// and the failure is recorded on the batch.
pub struct BatchEnricher<A: UpstreamApi> {
    api: Arc<A>,
    batch_size: usize,
    pacing: Pacing,
}

impl<A: UpstreamApi> BatchEnricher<A> {
    pub fn new(api: Arc<A>, batch_size: usize, pacing: Pacing) -> Self {
        Self {
            api,
            batch_size: batch_size.max(1),
            pacing,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[async_trait]
impl<A: UpstreamApi> Enricher for BatchEnricher<A> {
    fn source_tag(&self) -> &'static str {
        "multinfo"
    }

    async fn enrich(&self, identifiers: &[String]) -> EnrichmentBatch {
        let mut batch = EnrichmentBatch::default();
        let chunks = chunk_identifiers(identifiers, self.batch_size);
        let chunk_count = chunks.len();

        for (index, chunk) in chunks.iter().enumerate() {
            let payload = match self.api.lookup_batch(chunk).await {
                Ok(payload) => payload,
                Err(failure) => {
                    stage_warn!(
                        Stage::Enrich,
                        chunk = index + 1,
                        chunks = chunk_count,
                        "Batch lookup failed, keeping {} cards: {}",
                        batch.len(),
                        failure
                    );
                    batch.halted = Some(failure);
                    return batch;
                }
            };

            let cards = parse_batch_cards(&payload);
            stage_debug!(Stage::Enrich, chunk = index + 1, cards = cards.len(), "Batch chunk resolved");
            for card in cards {
                batch.cards.insert(card.identifier.clone(), card);
            }

            self.pacing.pause().await;
        }

        stage_info!(Stage::Enrich, chunks = chunk_count, "Resolved {} cards", batch.len());
        batch
    }
}
