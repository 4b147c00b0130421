//! Content id validation and cache keys.
//!
//! Incoming ids follow one of two shapes:
//!
//! - IMDb-style: `tt<digits>`, optionally `tt<digits>:<season>:<episode>`
//! - Kitsu-style: `kitsu:<digits>`, optionally `kitsu:<digits>:<episode>`
//!
//! Anything else is a validation miss: the handler answers with an empty
//! stream list without touching the cache or the limiter.
//!
//! The cache key space is the content id alone. Per-request personalization
//! (sort mode, languages, limits) never changes what is cached, only how the
//! cached set is filtered afterwards, so [`StreamId::cache_key`] is the full
//! canonical id and nothing more.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use smol_str::{SmolStr, format_smolstr};

static IMDB_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(tt\d+)(?::(\d+):(\d+))?$").expect("invalid imdb id pattern")
});

static KITSU_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)kitsu:(\d+)(?::(\d+))?$").expect("invalid kitsu id pattern")
});

/// A validated content id.
///
/// Cloning is cheap: the only owned data is a [`SmolStr`], which stores
/// short ids inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamId {
    /// An IMDb title without season/episode coordinates.
    Imdb {
        /// The `tt`-prefixed IMDb id.
        id: SmolStr,
    },
    /// An IMDb title addressed down to a single episode.
    ImdbEpisode {
        /// The `tt`-prefixed IMDb id.
        id: SmolStr,
        /// Season number.
        season: u32,
        /// Episode number within the season.
        episode: u32,
    },
    /// A Kitsu entry without an episode coordinate.
    Kitsu {
        /// Numeric Kitsu id.
        id: u32,
    },
    /// A Kitsu entry addressed down to a single episode.
    KitsuEpisode {
        /// Numeric Kitsu id.
        id: u32,
        /// Episode number.
        episode: u32,
    },
}

impl StreamId {
    /// Parses a raw id, returning `None` on a validation miss.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(captures) = IMDB_ID.captures(raw) {
            let id = SmolStr::new(captures.get(1)?.as_str().to_ascii_lowercase());
            return match (captures.get(2), captures.get(3)) {
                (Some(season), Some(episode)) => Some(StreamId::ImdbEpisode {
                    id,
                    season: season.as_str().parse().ok()?,
                    episode: episode.as_str().parse().ok()?,
                }),
                _ => Some(StreamId::Imdb { id }),
            };
        }
        if let Some(captures) = KITSU_ID.captures(raw) {
            let id = captures.get(1)?.as_str().parse().ok()?;
            return match captures.get(2) {
                Some(episode) => Some(StreamId::KitsuEpisode {
                    id,
                    episode: episode.as_str().parse().ok()?,
                }),
                None => Some(StreamId::Kitsu { id }),
            };
        }
        None
    }

    /// Returns the canonical id used as the cache key.
    pub fn cache_key(&self) -> SmolStr {
        match self {
            StreamId::Imdb { id } => id.clone(),
            StreamId::ImdbEpisode {
                id,
                season,
                episode,
            } => format_smolstr!("{id}:{season}:{episode}"),
            StreamId::Kitsu { id } => format_smolstr!("kitsu:{id}"),
            StreamId::KitsuEpisode { id, episode } => format_smolstr!("kitsu:{id}:{episode}"),
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_imdb_movie_id() {
        assert_eq!(
            StreamId::parse("tt0111161"),
            Some(StreamId::Imdb {
                id: "tt0111161".into()
            })
        );
    }

    #[test]
    fn parses_imdb_episode_id() {
        assert_eq!(
            StreamId::parse("tt0944947:3:9"),
            Some(StreamId::ImdbEpisode {
                id: "tt0944947".into(),
                season: 3,
                episode: 9,
            })
        );
    }

    #[test]
    fn parses_kitsu_ids() {
        assert_eq!(StreamId::parse("kitsu:1376"), Some(StreamId::Kitsu { id: 1376 }));
        assert_eq!(
            StreamId::parse("kitsu:1376:12"),
            Some(StreamId::KitsuEpisode {
                id: 1376,
                episode: 12,
            })
        );
    }

    #[test]
    fn accepts_uppercase_prefixes() {
        assert!(StreamId::parse("TT123").is_some());
        assert!(StreamId::parse("Kitsu:42").is_some());
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "tt", "ttabc", "tt123:1", "kitsu:", "kitsu:12:3:4", "movie:42", "tt123 "] {
            assert!(StreamId::parse(raw).is_none(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn cache_key_round_trips() {
        for raw in ["tt0111161", "tt0944947:3:9", "kitsu:1376", "kitsu:1376:12"] {
            let id = StreamId::parse(raw).expect("valid id");
            assert_eq!(id.cache_key(), raw);
        }
    }
}
