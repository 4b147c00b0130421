//! Background task offloading for stale-while-revalidate.
//!
//! When a stale-but-revalidatable value is served, the refresh runs in the
//! background so the caller is never blocked. The offloader tracks spawned
//! tasks by cache key, deduplicates per key, and lets tests wait for
//! everything in flight to settle.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use smol_str::SmolStr;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span};

#[derive(Debug)]
struct OffloaderInner {
    tasks: DashMap<SmolStr, JoinHandle<()>>,
}

/// Spawns and tracks background revalidation tasks.
///
/// Clones share the same task map.
#[derive(Debug, Clone, Default)]
pub struct Offloader {
    inner: Arc<OffloaderInner>,
}

impl Default for OffloaderInner {
    fn default() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }
}

impl Offloader {
    /// Creates an offloader with no tracked tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a background task keyed by cache key.
    ///
    /// If a task for the same key is still in flight, the new one is
    /// skipped. Returns `true` if the task was spawned.
    pub fn spawn<F>(&self, key: SmolStr, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(existing) = self.inner.tasks.get(&key)
            && !existing.is_finished()
        {
            debug!(%key, "revalidation already in flight");
            #[cfg(feature = "metrics")]
            metrics::counter!(*crate::metrics::OFFLOAD_DEDUPLICATED).increment(1);
            return false;
        }

        let span = info_span!("offload_revalidate", %key);
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(
            async move {
                task.await;
                inner.tasks.remove(&task_key);
            }
            .instrument(span),
        );
        self.inner.tasks.insert(key, handle);
        #[cfg(feature = "metrics")]
        metrics::counter!(*crate::metrics::OFFLOAD_SPAWNED).increment(1);
        true
    }

    /// Number of tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.inner
            .tasks
            .iter()
            .filter(|entry| !entry.is_finished())
            .count()
    }

    /// Waits until every tracked task has finished.
    pub async fn wait_all(&self) {
        loop {
            self.inner.tasks.retain(|_, handle| !handle.is_finished());
            if self.inner.tasks.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }
}
