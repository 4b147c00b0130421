#![warn(missing_docs)]
//! # seedbox
//!
//! A service layer that ranks and serves candidate media-stream records
//! under two constraints: candidate fetches are expensive and must be
//! concurrency-bounded, and results are cached with a graduated freshness
//! policy while per-request personalization stays out of the cache key.
//!
//! The pieces, leaves first:
//!
//! - [`Limiter`](limiter::Limiter) — bounds concurrent cache-miss fetches,
//!   rejecting overflow immediately instead of queuing without bound
//! - [`StreamCache`](cache::StreamCache) — key-based cache with
//!   fresh / stale-revalidate / stale-error tiers and single-flight
//!   de-duplication of concurrent refreshes
//! - [`Offloader`](offload::Offloader) — background execution of
//!   stale-while-revalidate refreshes
//! - [`StreamService`](service::StreamService) — the request handler wiring
//!   id validation, the repository fetch, the ranking pipeline and cache
//!   enrichment together
//!
//! All service objects are explicit and injectable: constructed once at
//! startup from [`ServiceConfig`](config::ServiceConfig) and passed by
//! reference into request handling.

/// Tiered TTL cache with single-flight refresh de-duplication.
pub mod cache;

/// Service configuration.
pub mod config;

/// Error types for stream request handling.
pub mod error;

/// Concurrency limiter with overflow rejection.
pub mod limiter;

/// Metrics collection for cache and limiter observability.
pub mod metrics;

/// Background task offloading for stale-while-revalidate.
pub mod offload;

/// The stream request handler.
pub mod service;

pub use cache::{CacheState, StreamCache};
pub use config::ServiceConfig;
pub use error::Error;
pub use limiter::Limiter;
pub use offload::Offloader;
pub use service::{StreamRequest, StreamResponse, StreamService};

pub use seedbox_core::{
    CacheParams, Candidate, CandidateRepository, ContentType, PolicyConfig, QualityPatterns,
    RequestOptions, SortMode, StreamEntry, StreamId,
};
