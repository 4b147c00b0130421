//! Raw candidate records and the repository seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{NotSupportedType, RepositoryError};

/// Maximum number of candidates a repository lookup returns.
pub const MAX_CANDIDATES: usize = 500;

/// Content type of a stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A standalone movie.
    Movie,
    /// An episodic series.
    Series,
}

impl std::str::FromStr for ContentType {
    type Err = NotSupportedType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(ContentType::Movie),
            "series" => Ok(ContentType::Series),
            other => Err(NotSupportedType(other.to_string())),
        }
    }
}

/// A raw candidate record as returned by the repository.
///
/// Immutable once fetched; the ranking pipeline only reorders and filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique id of the physical resource.
    pub info_hash: SmolStr,
    /// Index provider the record was scraped from.
    pub provider: SmolStr,
    /// Raw release title.
    pub title: String,
    /// Size in bytes, when known.
    pub size: Option<u64>,
    /// When the resource was uploaded.
    pub upload_date: DateTime<Utc>,
    /// Current seeder count.
    pub seeders: u32,
    /// Detected language tags.
    #[serde(default)]
    pub languages: Vec<SmolStr>,
    /// Detected resolution label (e.g. `1080p`).
    pub resolution: Option<SmolStr>,
    /// Index of the matched file within the resource, for multi-file
    /// resources.
    pub file_index: Option<u32>,
}

/// Query interface for candidate records.
///
/// Implementations are external (the storage/query layer is out of scope
/// here); each lookup returns at most [`MAX_CANDIDATES`] records, pre-sorted
/// by seeder count descending.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    /// Candidates for a movie, by IMDb id.
    async fn movie_entries_by_imdb_id(
        &self,
        imdb_id: &str,
    ) -> Result<Vec<Candidate>, RepositoryError>;

    /// Candidates for a single series episode, by IMDb id.
    async fn series_entries_by_imdb_id(
        &self,
        imdb_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<Vec<Candidate>, RepositoryError>;

    /// Candidates for a movie-shaped Kitsu entry.
    async fn movie_entries_by_kitsu_id(
        &self,
        kitsu_id: u32,
    ) -> Result<Vec<Candidate>, RepositoryError>;

    /// Candidates for a single episode of a Kitsu entry.
    async fn series_entries_by_kitsu_id(
        &self,
        kitsu_id: u32,
        episode: u32,
    ) -> Result<Vec<Candidate>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parses_known_values() {
        assert_eq!("movie".parse::<ContentType>().ok(), Some(ContentType::Movie));
        assert_eq!("series".parse::<ContentType>().ok(), Some(ContentType::Series));
    }

    #[test]
    fn content_type_rejects_unknown_values() {
        let err = "channel".parse::<ContentType>().unwrap_err();
        assert_eq!(err.to_string(), "not supported type channel");
        assert_eq!(err.0, "channel");
    }
}
