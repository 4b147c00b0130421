//! Concurrency limiter with overflow rejection.
//!
//! Candidate fetches are I/O bound; under load an unbounded queue produces
//! unbounded latency and memory growth. The limiter runs up to
//! `max_concurrent` tasks, parks up to `high_water` more in a FIFO queue,
//! and fails anything beyond that immediately with
//! [`Error::Overflow`] — a rejected task has not started and has no side
//! effects.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::Error;

const SEMAPHORE_CLOSED: &str = "limiter semaphore is never closed";

#[derive(Debug)]
struct LimiterInner {
    slots: Semaphore,
    queued: AtomicUsize,
    high_water: usize,
}

/// Bounds how many expensive fetches run at once.
///
/// Cloning is cheap and clones share the same slots and queue accounting.
#[derive(Debug, Clone)]
pub struct Limiter {
    inner: Arc<LimiterInner>,
}

impl Limiter {
    /// Creates a limiter with the given running and queued capacity.
    pub fn new(max_concurrent: usize, high_water: usize) -> Self {
        Self {
            inner: Arc::new(LimiterInner {
                slots: Semaphore::new(max_concurrent),
                queued: AtomicUsize::new(0),
                high_water,
            }),
        }
    }

    /// Runs a task under a concurrency slot.
    ///
    /// Starts immediately when a slot is free, waits FIFO while the queue is
    /// below the high-water mark, and fails fast otherwise. An accepted task
    /// runs to completion; there is no mid-flight cancellation.
    pub async fn schedule<F, T>(&self, task: F) -> Result<T, Error>
    where
        F: Future<Output = T>,
    {
        let permit = match self.inner.slots.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                let queued = self.inner.queued.fetch_add(1, Ordering::AcqRel);
                if queued >= self.inner.high_water {
                    self.inner.queued.fetch_sub(1, Ordering::AcqRel);
                    warn!(high_water = self.inner.high_water, "fetch queue overflow");
                    #[cfg(feature = "metrics")]
                    metrics::counter!(*crate::metrics::LIMITER_OVERFLOW).increment(1);
                    return Err(Error::Overflow);
                }
                debug!(queued = queued + 1, "fetch queued");
                let permit = self.inner.slots.acquire().await.expect(SEMAPHORE_CLOSED);
                self.inner.queued.fetch_sub(1, Ordering::AcqRel);
                permit
            }
        };
        let output = task.await;
        drop(permit);
        Ok(output)
    }

    /// Number of tasks currently waiting for a slot.
    pub fn queued(&self) -> usize {
        self.inner.queued.load(Ordering::Acquire)
    }

    /// Number of free running slots.
    pub fn available(&self) -> usize {
        self.inner.slots.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn runs_immediately_when_slots_are_free() {
        let limiter = Limiter::new(2, 1);
        let result = limiter.schedule(async { 7 }).await;
        assert_eq!(result.ok(), Some(7));
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test]
    async fn rejects_when_queue_is_full() {
        let limiter = Limiter::new(1, 1);
        let (hold_tx, hold_rx) = tokio::sync::oneshot::channel::<()>();

        // Occupy the single slot.
        let slot = {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter
                    .schedule(async move {
                        let _ = hold_rx.await;
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Fill the single queue position.
        let queued = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.schedule(async { 1 }).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(limiter.queued(), 1);

        // Third task overflows immediately.
        let overflow = limiter.schedule(async { 2 }).await;
        assert!(matches!(overflow, Err(Error::Overflow)));

        hold_tx.send(()).expect("holder alive");
        slot.await.expect("join").expect("scheduled");
        assert_eq!(queued.await.expect("join").ok(), Some(1));
    }

    #[tokio::test]
    async fn queued_tasks_run_after_slots_free_up() {
        let limiter = Limiter::new(1, 5);
        let mut handles = Vec::new();
        for i in 0..4 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter
                    .schedule(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        i
                    })
                    .await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.expect("join").ok(), Some(i));
        }
        assert_eq!(limiter.queued(), 0);
    }
}
