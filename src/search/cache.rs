//! Permanent response cache with strict singleflight per query.
//!
//! Each key maps to either a finished result or a pending computation. The
//! first caller for a missing key registers the pending computation under the
//! map's shard lock, so later callers for the same key always attach to it
//! instead of starting their own. The computation runs on its own task and
//! writes its result into the map before any waiter observes it; failures
//! remove the slot so the next request retries.
//!
//! Entries are never evicted.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::search::error::SearchError;
use crate::search::query::CacheKey;
use crate::search::transform::SearchResult;

type Outcome = Result<Arc<SearchResult>, SearchError>;
type PendingOutcome = Shared<BoxFuture<'static, Outcome>>;

#[derive(Clone)]
enum Slot {
    Ready(Arc<SearchResult>),
    Pending(PendingOutcome),
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a stored result.
    pub hits: u64,
    /// Lookups that started a computation.
    pub misses: u64,
    /// Lookups that joined a computation already in flight.
    pub coalesced: u64,
    /// Stored and pending keys.
    pub entries: usize,
}

#[derive(Clone, Default)]
pub struct ResponseCache {
    slots: Arc<DashMap<CacheKey, Slot>>,
    counters: Arc<Counters>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored result for `key`, or compute it exactly once.
    ///
    /// `compute` is only called when no result is stored and no computation is
    /// in flight for `key`. It is invoked while the key's shard is locked, so it
    /// must only build the future and must not touch this cache.
    pub async fn get_or_compute<F, Fut>(&self, key: &CacheKey, compute: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SearchResult, SearchError>> + Send + 'static,
    {
        let pending = match self.slots.entry(key.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(result) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "search cache hit");
                    return Ok(Arc::clone(result));
                }
                Slot::Pending(pending) => {
                    self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "joining in-flight search");
                    pending.clone()
                }
            },
            Entry::Vacant(entry) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "search cache miss");
                let pending = self.start(key.clone(), compute());
                entry.insert(Slot::Pending(pending.clone()));
                pending
            }
        };

        pending.await
    }

    /// Look up a stored result without computing anything.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<SearchResult>> {
        match self.slots.get(key)?.value() {
            Slot::Ready(result) => Some(Arc::clone(result)),
            Slot::Pending(_) => None,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            entries: self.slots.len(),
        }
    }

    /// Spawn the computation and return a handle every waiter can share.
    ///
    /// The spawned task keeps running if the request that started it goes away.
    fn start<Fut>(&self, key: CacheKey, work: Fut) -> PendingOutcome
    where
        Fut: Future<Output = Result<SearchResult, SearchError>> + Send + 'static,
    {
        let slots = Arc::clone(&self.slots);

        let task = tokio::spawn(async move {
            let outcome: Outcome = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(result) => result.map(Arc::new),
                Err(_) => Err(SearchError::Internal("search computation panicked".into())),
            };

            // Publish before returning so no waiter sees the result ahead of the map.
            match &outcome {
                Ok(result) => {
                    slots.insert(key, Slot::Ready(Arc::clone(result)));
                }
                Err(e) => {
                    slots.remove(&key);
                    debug!(key = %key, error = %e, "search failed, slot released");
                }
            }

            outcome
        });

        async move {
            task.await.unwrap_or_else(|e| {
                warn!(error = %e, "search task did not complete");
                Err(SearchError::Internal("search task did not complete".into()))
            })
        }
        .boxed()
        .shared()
    }
}
