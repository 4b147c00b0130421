//! Error types for stream request handling.
//!
//! Errors from fetch and ranking bubble up uncaught to the top-level
//! handler, which wraps them into a single descriptive failure. There is no
//! retry at this layer; the cache's stale-serving behavior is the only
//! resilience mechanism.

use std::sync::Arc;

use smol_str::SmolStr;
use thiserror::Error;

use seedbox_core::error::{NotSupportedType, RepositoryError};

/// Error type for stream request handling.
#[derive(Debug, Error)]
pub enum Error {
    /// Top-level failure as surfaced to the host framework.
    #[error("Failed request {id}: {source}")]
    Request {
        /// The content id of the failed request.
        id: SmolStr,
        /// The underlying failure, shared with any single-flight peers.
        #[source]
        source: Arc<Error>,
    },

    /// The limiter is at capacity and its pending queue is full.
    #[error("fetch queue overflow")]
    Overflow,

    /// The request carried an unrecognized content type.
    #[error(transparent)]
    NotSupported(#[from] NotSupportedType),

    /// The candidate repository fetch failed.
    #[error(transparent)]
    Upstream(#[from] RepositoryError),
}

impl Error {
    /// Wraps an error into the top-level request failure.
    pub(crate) fn request(id: SmolStr, source: Arc<Error>) -> Self {
        Error::Request { id, source }
    }
}
