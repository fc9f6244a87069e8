//! Set-query cache: one durable row per distinct ingredient combination.

use std::sync::Arc;

use metrics::counter;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::application::error::RetrievalError;
use crate::application::freshness::is_fresh;
use crate::application::repos::SearchCacheRepo;
use crate::application::upstream::RecipeApi;
use crate::domain::ingredients::IngredientKey;
use crate::domain::recipes::SearchPage;

pub struct SearchCacheService {
    store: Arc<dyn SearchCacheRepo>,
    upstream: Arc<dyn RecipeApi>,
    ttl: Duration,
    page_size: u32,
}

impl SearchCacheService {
    pub fn new(
        store: Arc<dyn SearchCacheRepo>,
        upstream: Arc<dyn RecipeApi>,
        ttl: Duration,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            upstream,
            ttl,
            page_size,
        }
    }

    /// Serve the search page for an ingredient set, going upstream only when
    /// the cached row is absent or stale.
    ///
    /// At most one upstream call and one store write per invocation. A failed
    /// refresh fails the lookup; the stale row is never served as a fallback.
    /// The row is written only after the full upstream response has decoded,
    /// so a cached payload is always a complete page.
    pub async fn lookup(&self, key: &IngredientKey) -> Result<SearchPage, RetrievalError> {
        let now = OffsetDateTime::now_utc();

        if let Some(entry) = self.store.find(key.as_str()).await? {
            if is_fresh(entry.updated_at, now, self.ttl) {
                counter!("larder_search_cache_hit_total").increment(1);
                debug!(
                    target = "application::search_cache",
                    key = %key,
                    "serving search page from cache"
                );
                return decode(&entry.payload);
            }
        }

        counter!("larder_search_cache_miss_total").increment(1);
        let page = self
            .upstream
            .search(key.ingredients(), self.page_size)
            .await?;

        let payload = encode(&page)?;
        self.store.upsert(key.as_str(), &payload, now).await?;
        debug!(
            target = "application::search_cache",
            key = %key,
            results = page.results.len(),
            "search page refreshed from upstream"
        );

        Ok(page)
    }
}

fn encode(page: &SearchPage) -> Result<String, RetrievalError> {
    serde_json::to_string(page).map_err(|err| RetrievalError::Codec(err.to_string()))
}

fn decode(payload: &str) -> Result<SearchPage, RetrievalError> {
    serde_json::from_str(payload).map_err(|err| RetrievalError::Codec(err.to_string()))
}
