//! Metrics declaration and initialization.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Cache tier metrics

    /// Track number of fresh cache hits.
    pub static ref CACHE_HIT: &'static str = {
        metrics::describe_counter!(
            "seedbox_cache_hit_total",
            "Total number of fresh cache hits."
        );
        "seedbox_cache_hit_total"
    };
    /// Track number of cache misses (no usable entry).
    pub static ref CACHE_MISS: &'static str = {
        metrics::describe_counter!(
            "seedbox_cache_miss_total",
            "Total number of cache misses."
        );
        "seedbox_cache_miss_total"
    };
    /// Track number of stale values served while revalidating.
    pub static ref CACHE_STALE_SERVED: &'static str = {
        metrics::describe_counter!(
            "seedbox_cache_stale_served_total",
            "Total number of stale values served while revalidating in the background."
        );
        "seedbox_cache_stale_served_total"
    };
    /// Track number of stale values served after a failed refresh.
    pub static ref CACHE_STALE_ERROR_FALLBACK: &'static str = {
        metrics::describe_counter!(
            "seedbox_cache_stale_error_fallback_total",
            "Total number of stale values served because a synchronous refresh failed."
        );
        "seedbox_cache_stale_error_fallback_total"
    };

    // Limiter metrics

    /// Track number of fetches rejected at the high-water mark.
    pub static ref LIMITER_OVERFLOW: &'static str = {
        metrics::describe_counter!(
            "seedbox_limiter_overflow_total",
            "Total number of fetches rejected because the pending queue was full."
        );
        "seedbox_limiter_overflow_total"
    };

    // Offload metrics

    /// Track number of background revalidations spawned.
    pub static ref OFFLOAD_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "seedbox_offload_spawned_total",
            "Total number of background revalidation tasks spawned."
        );
        "seedbox_offload_spawned_total"
    };
    /// Track number of background revalidations deduplicated (skipped).
    pub static ref OFFLOAD_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "seedbox_offload_deduplicated_total",
            "Total number of background revalidation tasks skipped because one was already in flight."
        );
        "seedbox_offload_deduplicated_total"
    };
}
