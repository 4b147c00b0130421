#![warn(missing_docs)]
//! # seedbox-core
//!
//! Domain types and the ranking pipeline for the seedbox stream service.
//!
//! This crate is pure and synchronous: everything here is a transform over
//! already-fetched data. The only async surface is the
//! [`CandidateRepository`] trait, which the service crate drives.
//!
//! ## Architecture
//!
//! - **Validate** incoming content ids ([`StreamId`])
//! - **Fetch** raw candidates through an injected repository
//!   ([`CandidateRepository`])
//! - **Map** candidates into generic stream entries ([`StreamEntry`])
//! - **Rank** entries per request: seeder-health gating, language
//!   partitioning, final sort mode and limits ([`rank_streams`])
//! - **Enrich** results with cache-control metadata ([`CacheParams`])

pub mod candidate;
pub mod entry;
pub mod error;
pub mod id;
pub mod languages;
pub mod policy;
pub mod quality;
pub mod sort;

pub use candidate::{Candidate, CandidateRepository, ContentType, MAX_CANDIDATES};
pub use entry::{FAILED_ACCESS, StreamEntry};
pub use error::{NotSupportedType, RepositoryError};
pub use id::StreamId;
pub use languages::{
    LanguageOption, contains_language, language_label, language_options, map_languages,
};
pub use policy::{CacheParams, PolicyConfig};
pub use quality::{QualityOption, QualityPatterns, QualityTier};
pub use sort::{RequestOptions, SortMode, apply_base_order, rank_streams};
