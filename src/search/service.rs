//! The search pipeline: cached, singleflight fetch-then-rank per query.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::books::models::VolumeList;
use crate::search::cache::ResponseCache;
use crate::search::error::SearchError;
use crate::search::query::SearchQuery;
use crate::search::transform::{SearchResult, transform};
use crate::utils::{fmt_duration, log_if_slow};

/// Upstream fetches slower than this are logged as warnings.
const SLOW_FETCH: Duration = Duration::from_secs(2);

/// Source of raw catalog payloads for a query.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<VolumeList, SearchError>;
}

/// Shared search front-end. Clone-cheap.
#[derive(Clone)]
pub struct SearchService {
    source: Arc<dyn CatalogSource>,
    cache: ResponseCache,
}

impl SearchService {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            cache: ResponseCache::new(),
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Resolve a query from the cache, fetching and ranking it on a miss.
    pub async fn search(&self, query: &SearchQuery) -> Result<Arc<SearchResult>, SearchError> {
        let source = Arc::clone(&self.source);
        let text = query.as_str().to_owned();

        self.cache
            .get_or_compute(&query.cache_key(), move || async move {
                let start = Instant::now();
                let list = source.fetch(&text).await?;
                log_if_slow(start, SLOW_FETCH, "books api fetch");

                let result = transform(list)?;
                debug!(
                    query = %text,
                    items = result.total_count,
                    duration = fmt_duration(start.elapsed()),
                    "search computed"
                );
                Ok(result)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::models::{Volume, VolumeInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned catalog keyed on the query text.
    struct FakeCatalog {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl FakeCatalog {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
            })
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn fetch(&self, query: &str) -> Result<VolumeList, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match query {
                "missing" => Ok(VolumeList::default()),
                "down" => Err(SearchError::UpstreamUnavailable("refused".into())),
                _ => Ok(VolumeList {
                    total_items: Some(2),
                    items: Some(vec![
                        Volume {
                            volume_info: Some(VolumeInfo {
                                title: Some(format!("{query} basics")),
                                description: Some("a plain intro".into()),
                            }),
                        },
                        Volume {
                            volume_info: Some(VolumeInfo {
                                title: Some(format!("{query} advanced")),
                                description: Some("The Deep End".into()),
                            }),
                        },
                    ]),
                }),
            }
        }
    }

    fn query(q: &str) -> SearchQuery {
        SearchQuery::new(q).unwrap()
    }

    #[tokio::test]
    async fn test_search_ranks_and_caches() {
        let catalog = FakeCatalog::new(Duration::ZERO);
        let service = SearchService::new(catalog.clone());

        let first = service.search(&query("rust")).await.unwrap();
        assert_eq!(first.total_count, 2);
        assert_eq!(first.items[0].title, "rust advanced");
        assert_eq!(first.items[0].uppercase_word_count, 3);

        let second = service.search(&query("  rust ")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identical_searches_fetch_once() {
        let catalog = FakeCatalog::new(Duration::from_millis(100));
        let service = SearchService::new(catalog.clone());

        let searches = (0..10).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.search(&query("tolkien")).await })
        });
        for joined in futures::future::join_all(searches).await {
            assert!(joined.unwrap().is_ok());
        }

        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_catalog_is_not_found_and_retried() {
        let catalog = FakeCatalog::new(Duration::ZERO);
        let service = SearchService::new(catalog.clone());

        for _ in 0..2 {
            let result = service.search(&query("missing")).await;
            assert_eq!(result.unwrap_err(), SearchError::NoItemsFound);
        }
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let catalog = FakeCatalog::new(Duration::ZERO);
        let service = SearchService::new(catalog);

        let result = service.search(&query("down")).await;
        assert!(matches!(result, Err(SearchError::UpstreamUnavailable(_))));
        assert_eq!(service.cache().stats().entries, 0);
    }
}
