//! Bulk-identifier cache: one durable row per recipe id.
//!
//! Rows are populated incrementally from whatever callers ask for. A lookup
//! partitions its ids into fresh and gap, fills the whole gap with a single
//! batched upstream call, and merges. Each row's freshness is independent;
//! a stale neighbor never invalidates a fresh one.

use std::sync::Arc;

use metrics::counter;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::application::error::RetrievalError;
use crate::application::freshness::is_fresh;
use crate::application::repos::DetailCacheRepo;
use crate::application::upstream::RecipeApi;
use crate::domain::recipes::RecipeDetail;

pub struct DetailCacheService {
    store: Arc<dyn DetailCacheRepo>,
    upstream: Arc<dyn RecipeApi>,
    ttl: Duration,
}

impl DetailCacheService {
    pub fn new(store: Arc<dyn DetailCacheRepo>, upstream: Arc<dyn RecipeApi>, ttl: Duration) -> Self {
        Self {
            store,
            upstream,
            ttl,
        }
    }

    /// Resolve detail records for a set of ids. Duplicates are tolerated and
    /// resolved once. Ids the upstream cannot resolve are absent from the
    /// result; callers check for what they asked for.
    ///
    /// The gap is filled with exactly one upstream call, never one per id. A
    /// failed fill fails the whole call, fresh hits included: partial results
    /// are not returned.
    pub async fn lookup_many(&self, ids: &[String]) -> Result<Vec<RecipeDetail>, RetrievalError> {
        let mut wanted: Vec<String> = ids.to_vec();
        wanted.sort();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let now = OffsetDateTime::now_utc();
        let rows = self.store.find_many(&wanted).await?;

        let mut details = Vec::with_capacity(wanted.len());
        let mut fresh_ids = Vec::new();
        for row in rows {
            if is_fresh(row.updated_at, now, self.ttl) {
                details.push(decode(&row.payload)?);
                fresh_ids.push(row.id);
            }
        }

        let gap: Vec<String> = wanted
            .iter()
            .filter(|id| !fresh_ids.contains(*id))
            .cloned()
            .collect();

        counter!("larder_detail_cache_hit_total").increment(fresh_ids.len() as u64);

        if !gap.is_empty() {
            counter!("larder_detail_cache_miss_total").increment(gap.len() as u64);
            counter!("larder_detail_gap_fill_total").increment(1);

            let fetched = self.upstream.details_bulk(&gap).await?;
            for detail in &fetched {
                let payload = encode(detail)?;
                self.store.upsert(&detail.cache_id(), &payload, now).await?;
            }
            debug!(
                target = "application::detail_cache",
                requested = gap.len(),
                resolved = fetched.len(),
                "detail gap filled from upstream"
            );
            details.extend(fetched);
        } else {
            debug!(
                target = "application::detail_cache",
                ids = wanted.len(),
                "all detail rows fresh"
            );
        }

        Ok(details)
    }
}

fn encode(detail: &RecipeDetail) -> Result<String, RetrievalError> {
    serde_json::to_string(detail).map_err(|err| RetrievalError::Codec(err.to_string()))
}

fn decode(payload: &str) -> Result<RecipeDetail, RetrievalError> {
    serde_json::from_str(payload).map_err(|err| RetrievalError::Codec(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::freshness::DEFAULT_TTL;
    use crate::application::repos::{DetailCacheEntry, RepoError};
    use crate::application::upstream::UpstreamError;
    use crate::domain::recipes::{IngredientSuggestion, SearchPage};

    #[derive(Default)]
    struct MemoryDetailRepo {
        rows: Mutex<HashMap<String, DetailCacheEntry>>,
    }

    impl MemoryDetailRepo {
        fn seed(&self, id: &str, detail: &RecipeDetail, updated_at: OffsetDateTime) {
            self.rows.lock().unwrap().insert(
                id.to_string(),
                DetailCacheEntry {
                    id: id.to_string(),
                    payload: serde_json::to_string(detail).unwrap(),
                    updated_at,
                },
            );
        }

        fn row(&self, id: &str) -> Option<DetailCacheEntry> {
            self.rows.lock().unwrap().get(id).cloned()
        }
    }

    #[async_trait]
    impl DetailCacheRepo for MemoryDetailRepo {
        async fn find_many(&self, ids: &[String]) -> Result<Vec<DetailCacheEntry>, RepoError> {
            let rows = self.rows.lock().unwrap();
            Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
        }

        async fn upsert(
            &self,
            id: &str,
            payload: &str,
            updated_at: OffsetDateTime,
        ) -> Result<(), RepoError> {
            self.rows.lock().unwrap().insert(
                id.to_string(),
                DetailCacheEntry {
                    id: id.to_string(),
                    payload: payload.to_string(),
                    updated_at,
                },
            );
            Ok(())
        }

        async fn prune_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|_, entry| entry.updated_at >= cutoff);
            Ok((before - rows.len()) as u64)
        }
    }

    #[derive(Default)]
    struct StubBulkApi {
        records: Vec<RecipeDetail>,
        fail_with: Option<fn() -> UpstreamError>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl StubBulkApi {
        fn returning(records: Vec<RecipeDetail>) -> Self {
            Self {
                records,
                ..Self::default()
            }
        }

        fn failing(err: fn() -> UpstreamError) -> Self {
            Self {
                fail_with: Some(err),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecipeApi for StubBulkApi {
        async fn search(
            &self,
            _ingredients: &[String],
            _limit: u32,
        ) -> Result<SearchPage, UpstreamError> {
            unreachable!("not used in these tests")
        }

        async fn details_bulk(&self, ids: &[String]) -> Result<Vec<RecipeDetail>, UpstreamError> {
            self.calls.lock().unwrap().push(ids.to_vec());
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            // Answer with whichever configured records were asked for, in
            // upstream's arbitrary order.
            Ok(self
                .records
                .iter()
                .filter(|detail| ids.contains(&detail.cache_id()))
                .cloned()
                .collect())
        }

        async fn autocomplete(
            &self,
            _query: &str,
        ) -> Result<Vec<IngredientSuggestion>, UpstreamError> {
            unreachable!("not used in these tests")
        }
    }

    fn detail(id: i64, title: &str) -> RecipeDetail {
        RecipeDetail {
            id,
            title: title.to_string(),
            image: None,
            summary: None,
            ready_in_minutes: None,
            servings: None,
            source_url: None,
            instructions: None,
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn service(repo: Arc<MemoryDetailRepo>, api: Arc<StubBulkApi>) -> DetailCacheService {
        DetailCacheService::new(repo, api, DEFAULT_TTL)
    }

    #[tokio::test]
    async fn miss_populates_and_the_next_call_is_served_from_cache() {
        let repo = Arc::new(MemoryDetailRepo::default());
        let api = Arc::new(StubBulkApi::returning(vec![detail(12345, "Shakshuka")]));
        let svc = service(repo.clone(), api.clone());

        let first = svc.lookup_many(&ids(&["12345"])).await.expect("first");
        assert_eq!(first, vec![detail(12345, "Shakshuka")]);
        assert_eq!(api.calls(), vec![ids(&["12345"])]);
        assert!(repo.row("12345").is_some());

        let second = svc.lookup_many(&ids(&["12345"])).await.expect("second");
        assert_eq!(second, first);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn partial_gap_fill_fetches_only_the_missing_id() {
        let repo = Arc::new(MemoryDetailRepo::default());
        let api = Arc::new(StubBulkApi::returning(vec![detail(2, "Minestrone")]));
        repo.seed("1", &detail(1, "Frittata"), OffsetDateTime::now_utc());

        let svc = service(repo.clone(), api.clone());
        let served = svc.lookup_many(&ids(&["1", "2"])).await.expect("lookup");

        assert_eq!(api.calls(), vec![ids(&["2"])]);
        let mut titles: Vec<&str> = served.iter().map(|d| d.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, ["Frittata", "Minestrone"]);
    }

    #[tokio::test]
    async fn stale_row_counts_as_gap_and_is_overwritten() {
        let repo = Arc::new(MemoryDetailRepo::default());
        let api = Arc::new(StubBulkApi::returning(vec![detail(3, "Ribollita v2")]));
        let stale = OffsetDateTime::now_utc() - DEFAULT_TTL - Duration::hours(1);
        repo.seed("3", &detail(3, "Ribollita"), stale);

        let svc = service(repo.clone(), api.clone());
        let served = svc.lookup_many(&ids(&["3"])).await.expect("lookup");

        assert_eq!(api.calls(), vec![ids(&["3"])]);
        assert_eq!(served, vec![detail(3, "Ribollita v2")]);
        let row = repo.row("3").expect("row");
        assert!(row.updated_at > stale);
        assert!(row.payload.contains("Ribollita v2"));
    }

    #[tokio::test]
    async fn bulk_failure_discards_fresh_hits() {
        let repo = Arc::new(MemoryDetailRepo::default());
        let api = Arc::new(StubBulkApi::failing(|| UpstreamError::Status {
            status: 500,
        }));
        repo.seed("1", &detail(1, "Frittata"), OffsetDateTime::now_utc());

        let svc = service(repo.clone(), api.clone());
        let err = svc
            .lookup_many(&ids(&["1", "2"]))
            .await
            .expect_err("whole call must fail");

        // Current contract: all-or-nothing, even though id 1 was fresh.
        assert!(matches!(
            err,
            RetrievalError::Upstream(UpstreamError::Status { status: 500 })
        ));
        assert_eq!(api.calls(), vec![ids(&["2"])]);
    }

    #[tokio::test]
    async fn duplicate_ids_are_resolved_once() {
        let repo = Arc::new(MemoryDetailRepo::default());
        let api = Arc::new(StubBulkApi::returning(vec![detail(7, "Congee")]));
        let svc = service(repo.clone(), api.clone());

        let served = svc
            .lookup_many(&ids(&["7", "7", "7"]))
            .await
            .expect("lookup");

        assert_eq!(api.calls(), vec![ids(&["7"])]);
        assert_eq!(served.len(), 1);
    }

    #[tokio::test]
    async fn unresolvable_ids_are_absent_not_an_error() {
        let repo = Arc::new(MemoryDetailRepo::default());
        let api = Arc::new(StubBulkApi::returning(vec![detail(8, "Laksa")]));
        let svc = service(repo.clone(), api.clone());

        let served = svc.lookup_many(&ids(&["8", "9"])).await.expect("lookup");

        assert_eq!(api.calls(), vec![ids(&["8", "9"])]);
        assert_eq!(served, vec![detail(8, "Laksa")]);
        assert!(repo.row("9").is_none());
    }

    #[tokio::test]
    async fn missing_credential_maps_to_configuration_error() {
        let repo = Arc::new(MemoryDetailRepo::default());
        let api = Arc::new(StubBulkApi::failing(|| UpstreamError::MissingCredential));
        let svc = service(repo.clone(), api.clone());

        let err = svc.lookup_many(&ids(&["4"])).await.expect_err("must fail");
        assert!(matches!(err, RetrievalError::Configuration));
    }

    #[tokio::test]
    async fn empty_input_short_circuits() {
        let repo = Arc::new(MemoryDetailRepo::default());
        let api = Arc::new(StubBulkApi::returning(Vec::new()));
        let svc = service(repo.clone(), api.clone());

        let served = svc.lookup_many(&[]).await.expect("lookup");
        assert!(served.is_empty());
        assert!(api.calls().is_empty());
    }
}
