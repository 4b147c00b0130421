//! Error types for the domain layer.

use thiserror::Error;

/// Error returned by [`CandidateRepository`](crate::CandidateRepository)
/// implementations.
///
/// The repository is an external collaborator (database, index service),
/// so its failures are carried as an opaque boxed error, the same way
/// backend errors are wrapped at a storage seam.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct RepositoryError(Box<dyn std::error::Error + Send + Sync>);

impl RepositoryError {
    /// Wraps any error as a repository failure.
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Box::new(error))
    }

    /// Wraps a plain message as a repository failure.
    pub fn message(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

/// The request carried a content type this service does not serve.
#[derive(Debug, Error)]
#[error("not supported type {0}")]
pub struct NotSupportedType(pub String);
