//! Tiered TTL cache with single-flight refresh de-duplication.
//!
//! One entry per content id, carrying three monotonically non-decreasing
//! horizons: `fresh_until ≤ stale_revalidate_until ≤ stale_error_until`.
//! Lookups resolve to one of four states:
//!
//! - **Fresh** — return the cached value, no scheduling.
//! - **StaleRevalidate** — return the stale value immediately and refresh in
//!   the background, best-effort.
//! - **StaleError** — block on a synchronous refresh; if it fails, fall back
//!   to the stale value instead of propagating the error.
//! - **Expired** (or missing) — block on a synchronous refresh; failures
//!   propagate.
//!
//! Refreshes are single-flight: concurrent callers for the same key attach
//! to one shared in-flight computation and therefore consume one limiter
//! slot between them. The horizons of a stored entry come from
//! [`CacheParams::for_streams`]; a result whose tier is not cacheable
//! (`max_age == 0`) evicts instead of storing.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use smol_str::SmolStr;
use tracing::{debug, warn};

use seedbox_core::{CacheParams, PolicyConfig, StreamEntry};

use crate::error::Error;
use crate::offload::Offloader;

/// Cached generic result, shared between callers without copying.
pub type CachedStreams = Arc<Vec<StreamEntry>>;

/// Outcome of a refresh, cloneable so single-flight peers can share it.
pub type RefreshResult = Result<CachedStreams, Arc<Error>>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

/// Freshness state of a cache entry at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Within the fresh window.
    Fresh,
    /// Past fresh, within the stale-revalidate horizon.
    StaleRevalidate,
    /// Past stale-revalidate, within the stale-error horizon.
    StaleError,
    /// Past every horizon.
    Expired,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    streams: CachedStreams,
    fresh_until: DateTime<Utc>,
    stale_revalidate_until: DateTime<Utc>,
    stale_error_until: DateTime<Utc>,
}

impl CacheEntry {
    fn state(&self, now: DateTime<Utc>) -> CacheState {
        if now < self.fresh_until {
            CacheState::Fresh
        } else if now < self.stale_revalidate_until {
            CacheState::StaleRevalidate
        } else if now < self.stale_error_until {
            CacheState::StaleError
        } else {
            CacheState::Expired
        }
    }
}

struct CacheInner {
    entries: DashMap<SmolStr, CacheEntry>,
    inflight: DashMap<SmolStr, SharedRefresh>,
    policy: PolicyConfig,
    offload: Offloader,
}

impl CacheInner {
    fn store(&self, key: &SmolStr, streams: &CachedStreams) {
        let params = CacheParams::for_streams(streams, &self.policy);
        if !params.is_cacheable() {
            // A universally-failed result is never cached; drop any
            // previous entry so the next request recomputes.
            self.entries.remove(key);
            debug!(%key, "refresh result not cacheable");
            return;
        }
        let fresh_until = Utc::now() + params.max_age;
        self.entries.insert(
            key.clone(),
            CacheEntry {
                streams: Arc::clone(streams),
                fresh_until,
                stale_revalidate_until: fresh_until + params.stale_revalidate,
                stale_error_until: fresh_until + params.stale_error,
            },
        );
    }
}

/// The stream result cache.
///
/// Stores the generic (pre-personalization) ranked result per content id.
/// Clones share the same entries and in-flight markers.
#[derive(Clone)]
pub struct StreamCache {
    inner: Arc<CacheInner>,
}

impl StreamCache {
    /// Creates a cache with the given TTL policy and offloader.
    pub fn new(policy: PolicyConfig, offload: Offloader) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                inflight: DashMap::new(),
                policy,
                offload,
            }),
        }
    }

    /// Looks up `key` and refreshes through `compute` as its tier demands.
    ///
    /// `compute` is invoked at most once per underlying refresh, no matter
    /// how many callers arrive concurrently for the same key.
    pub async fn get_or_refresh<F, Fut>(&self, key: SmolStr, compute: F) -> RefreshResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<StreamEntry>, Error>> + Send + 'static,
    {
        let cached = self
            .inner
            .entries
            .get(&key)
            .map(|entry| (entry.state(Utc::now()), Arc::clone(&entry.streams)));

        match cached {
            Some((CacheState::Fresh, streams)) => {
                debug!(%key, "cache hit");
                #[cfg(feature = "metrics")]
                metrics::counter!(*crate::metrics::CACHE_HIT).increment(1);
                Ok(streams)
            }
            Some((CacheState::StaleRevalidate, streams)) => {
                debug!(%key, "serving stale, revalidating in background");
                #[cfg(feature = "metrics")]
                metrics::counter!(*crate::metrics::CACHE_STALE_SERVED).increment(1);
                let refresh = self.refresh(key.clone(), compute);
                self.inner.offload.spawn(key, async move {
                    // Best-effort: a failed background refresh leaves the
                    // stale entry in place.
                    let _ = refresh.await;
                });
                Ok(streams)
            }
            Some((CacheState::StaleError, streams)) => match self.refresh(key.clone(), compute).await {
                Ok(fresh) => Ok(fresh),
                Err(error) => {
                    warn!(%key, %error, "refresh failed, serving stale");
                    #[cfg(feature = "metrics")]
                    metrics::counter!(*crate::metrics::CACHE_STALE_ERROR_FALLBACK).increment(1);
                    Ok(streams)
                }
            },
            Some((CacheState::Expired, _)) | None => {
                #[cfg(feature = "metrics")]
                metrics::counter!(*crate::metrics::CACHE_MISS).increment(1);
                self.refresh(key, compute).await
            }
        }
    }

    /// Returns the state of the entry under `key`, if any.
    pub fn state(&self, key: &str) -> Option<CacheState> {
        self.inner
            .entries
            .get(key)
            .map(|entry| entry.state(Utc::now()))
    }

    /// Waits for any in-flight background revalidations to settle.
    pub async fn wait_for_revalidations(&self) {
        self.inner.offload.wait_all().await;
    }

    /// Starts a refresh for `key`, or attaches to the one already running.
    fn refresh<F, Fut>(&self, key: SmolStr, compute: F) -> SharedRefresh
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<StreamEntry>, Error>> + Send + 'static,
    {
        if let Some(existing) = self.inner.inflight.get(&key) {
            debug!(%key, "attaching to in-flight refresh");
            return existing.clone();
        }

        let inner = Arc::clone(&self.inner);
        let refresh_key = key.clone();
        let task = compute();
        let shared = async move {
            let result = match task.await {
                Ok(streams) => {
                    let streams = Arc::new(streams);
                    inner.store(&refresh_key, &streams);
                    Ok(streams)
                }
                Err(error) => Err(Arc::new(error)),
            };
            inner.inflight.remove(&refresh_key);
            result
        }
        .boxed()
        .shared();

        // A racing caller may have inserted between the lookup above and
        // this entry call; if so, our unpolled computation is dropped and
        // theirs wins.
        match self.inner.inflight.entry(key) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                slot.insert(shared.clone());
                shared
            }
        }
    }
}

impl std::fmt::Debug for StreamCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCache")
            .field("entries", &self.inner.entries.len())
            .field("inflight", &self.inner.inflight.len())
            .finish()
    }
}
