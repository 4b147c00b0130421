//! The stream request handler.
//!
//! [`StreamService::handle`] runs the full request path: id validation,
//! cache lookup keyed on the content id alone, a limiter-guarded repository
//! fetch on miss, base ordering and mapping into generic stream records,
//! then the per-request half that never touches the cache: language
//! partitioning, final sort mode, limits, and cache-control enrichment.

use std::sync::Arc;

use smol_str::SmolStr;
use tracing::debug;

use seedbox_core::{
    CacheParams, Candidate, CandidateRepository, ContentType, MAX_CANDIDATES, PolicyConfig,
    QualityPatterns, RepositoryError, RequestOptions, StreamEntry, StreamId, apply_base_order,
    rank_streams,
};

use crate::cache::StreamCache;
use crate::config::ServiceConfig;
use crate::error::Error;
use crate::limiter::Limiter;
use crate::offload::Offloader;

/// A single stream request, as received from the host framework.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// The declared content type, `"movie"` or `"series"`.
    pub content_type: SmolStr,
    /// The content id: `tt…[:season:episode]` or `kitsu:…[:episode]`.
    pub id: SmolStr,
    /// Per-request ranking preferences.
    pub options: RequestOptions,
}

/// A ranked stream list plus the cache-control metadata derived from the
/// generic (pre-personalization) result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamResponse {
    /// Ranked, personalized stream entries.
    pub streams: Vec<StreamEntry>,
    /// Fresh window, in seconds. Zero means the result must not be cached.
    pub cache_max_age: u64,
    /// Stale-revalidate horizon beyond fresh, in seconds.
    pub stale_revalidate: u64,
    /// Stale-error horizon beyond fresh, in seconds.
    pub stale_error: u64,
}

impl StreamResponse {
    fn new(streams: Vec<StreamEntry>, params: CacheParams) -> Self {
        Self {
            streams,
            cache_max_age: params.max_age.as_secs(),
            stale_revalidate: params.stale_revalidate.as_secs(),
            stale_error: params.stale_error.as_secs(),
        }
    }
}

/// The stream request handler.
///
/// Holds the repository, the limiter and the cache; cheap to clone, clones
/// share all state.
#[derive(Clone)]
pub struct StreamService {
    repository: Arc<dyn CandidateRepository>,
    cache: StreamCache,
    limiter: Limiter,
    patterns: QualityPatterns,
    policy: PolicyConfig,
}

impl StreamService {
    /// Builds a service from configuration and a candidate repository.
    pub fn new(config: ServiceConfig, repository: Arc<dyn CandidateRepository>) -> Self {
        let cache = StreamCache::new(config.policy.clone(), Offloader::new());
        let limiter = Limiter::new(config.max_concurrent, config.queue_size);
        Self {
            repository,
            cache,
            limiter,
            patterns: QualityPatterns::default(),
            policy: config.policy,
        }
    }

    /// Replaces the default quality patterns.
    pub fn with_quality_patterns(mut self, patterns: QualityPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// The underlying cache.
    pub fn cache(&self) -> &StreamCache {
        &self.cache
    }

    /// Handles a stream request end to end.
    ///
    /// Ids that match neither the IMDb nor the Kitsu shape resolve to an
    /// empty response without touching the cache or the limiter. Every
    /// other failure is wrapped into a `Failed request <id>: <cause>`
    /// error.
    pub async fn handle(&self, request: &StreamRequest) -> Result<StreamResponse, Error> {
        let Some(stream_id) = StreamId::parse(&request.id) else {
            debug!(id = %request.id, "unrecognized id shape");
            let params = CacheParams::for_streams(&[], &self.policy);
            return Ok(StreamResponse::new(Vec::new(), params));
        };

        match self.handle_parsed(request, stream_id).await {
            Ok(response) => Ok(response),
            Err(source) => Err(Error::request(request.id.clone(), source)),
        }
    }

    async fn handle_parsed(
        &self,
        request: &StreamRequest,
        stream_id: StreamId,
    ) -> Result<StreamResponse, Arc<Error>> {
        let content_type: ContentType = request
            .content_type
            .parse()
            .map_err(|unsupported| Arc::new(Error::NotSupported(unsupported)))?;

        let repository = Arc::clone(&self.repository);
        let limiter = self.limiter.clone();
        let fetch_id = stream_id.clone();
        let generic = self
            .cache
            .get_or_refresh(stream_id.cache_key(), move || async move {
                let candidates = limiter
                    .schedule(fetch_candidates(repository, content_type, fetch_id))
                    .await??;
                Ok(build_generic_streams(candidates))
            })
            .await?;

        let params = CacheParams::for_streams(&generic, &self.policy);
        let streams = rank_streams(
            (*generic).clone(),
            &request.options,
            content_type,
            &self.patterns,
        );
        debug!(
            id = %request.id,
            streams = streams.len(),
            cache_max_age = params.max_age.as_secs(),
            "request served"
        );
        Ok(StreamResponse::new(streams, params))
    }
}

impl std::fmt::Debug for StreamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamService")
            .field("cache", &self.cache)
            .field("limiter", &self.limiter)
            .finish()
    }
}

/// Routes the lookup to the repository method matching the id shape.
///
/// Kitsu ids route by their own shape regardless of the declared type: an
/// episode coordinate means a series lookup, its absence a movie lookup.
/// An IMDb shape that disagrees with the declared type resolves to no
/// candidates rather than an error.
async fn fetch_candidates(
    repository: Arc<dyn CandidateRepository>,
    content_type: ContentType,
    id: StreamId,
) -> Result<Vec<Candidate>, RepositoryError> {
    match (content_type, id) {
        (ContentType::Movie, StreamId::Imdb { id }) => {
            repository.movie_entries_by_imdb_id(&id).await
        }
        (
            ContentType::Series,
            StreamId::ImdbEpisode {
                id,
                season,
                episode,
            },
        ) => {
            repository
                .series_entries_by_imdb_id(&id, season, episode)
                .await
        }
        (_, StreamId::Kitsu { id }) => repository.movie_entries_by_kitsu_id(id).await,
        (_, StreamId::KitsuEpisode { id, episode }) => {
            repository.series_entries_by_kitsu_id(id, episode).await
        }
        _ => Ok(Vec::new()),
    }
}

/// Base-orders the fetched candidates and maps them into generic entries.
fn build_generic_streams(mut candidates: Vec<Candidate>) -> Vec<StreamEntry> {
    apply_base_order(&mut candidates);
    candidates.truncate(MAX_CANDIDATES);
    candidates.iter().map(StreamEntry::from_candidate).collect()
}
