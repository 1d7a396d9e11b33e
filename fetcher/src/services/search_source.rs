//! Paginated candidate discovery

use std::sync::Arc;

use shared::extract::extract_items;
use shared::{stage_debug, stage_error, stage_info, CandidateRecord, Stage};
use crate::core::parse_search_item;
use crate::error::{FetchError, FetchResult};
use crate::traits::UpstreamApi;
use crate::types::{Pacing, SearchQuery};

/// Walks search pages in order until an empty page or the page cap.
///
/// Any failed page ends the run: auth/quota refusals as
/// [`FetchError::QuotaExhausted`], everything else as
/// [`FetchError::PageFailed`]. There is no per-page retry.
pub struct SearchSource<A: UpstreamApi> {
    api: Arc<A>,
    pacing: Pacing,
}

impl<A: UpstreamApi> SearchSource<A> {
    pub fn new(api: Arc<A>, pacing: Pacing) -> Self {
        Self { api, pacing }
    }

    pub async fn discover(&self, query: &SearchQuery, max_pages: u32) -> FetchResult<Vec<CandidateRecord>> {
        let mut candidates = Vec::new();

        for page in 1..=max_pages {
            let payload = match self.api.search(&query.at_page(page)).await {
                Ok(payload) => payload,
                Err(failure) if failure.is_auth_or_quota() => {
                    stage_error!(Stage::Search, page, "Upstream refused search: {}", failure);
                    return Err(FetchError::QuotaExhausted {
                        stage: Stage::Search,
                        failure,
                    });
                }
                Err(failure) => {
                    stage_error!(Stage::Search, page, "Search page failed: {}", failure);
                    return Err(FetchError::PageFailed {
                        stage: Stage::Search,
                        page,
                        failure,
                    });
                }
            };

            let items = extract_items(&payload);
            if items.is_empty() {
                stage_info!(Stage::Search, page, "Empty page, search exhausted");
                break;
            }

            let before = candidates.len();
            candidates.extend(items.into_iter().filter_map(parse_search_item));
            stage_debug!(
                Stage::Search,
                page,
                parsed = candidates.len() - before,
                total = candidates.len(),
                "Search page parsed"
            );

            self.pacing.pause().await;
        }

        Ok(candidates)
    }
}
