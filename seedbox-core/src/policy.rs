//! Cache policy configuration and response enrichment.
//!
//! The freshness tier attached to a result depends on what the result
//! contains:
//!
//! - an empty list gets a short fresh window, so absence of data is retried
//!   soon;
//! - a result where every entry is the failed-access placeholder is not
//!   cached at all;
//! - anything else gets the standard fresh window plus fixed
//!   stale-revalidate and stale-error horizons beyond it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entry::StreamEntry;

/// TTL configuration for cached stream results.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct PolicyConfig {
    /// Fresh window for a normal result (e.g. "1h").
    #[serde(default = "default_max_age", with = "humantime_serde")]
    pub max_age: Duration,
    /// Fresh window for an empty result (e.g. "60s").
    #[serde(default = "default_empty_max_age", with = "humantime_serde")]
    pub empty_max_age: Duration,
    /// Stale-revalidate horizon beyond the fresh window (e.g. "4h").
    #[serde(default = "default_stale_revalidate", with = "humantime_serde")]
    pub stale_revalidate: Duration,
    /// Stale-error horizon beyond the fresh window (e.g. "7d").
    #[serde(default = "default_stale_error", with = "humantime_serde")]
    pub stale_error: Duration,
}

fn default_max_age() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_empty_max_age() -> Duration {
    Duration::from_secs(60)
}

fn default_stale_revalidate() -> Duration {
    Duration::from_secs(4 * 60 * 60)
}

fn default_stale_error() -> Duration {
    Duration::from_secs(7 * 24 * 60 * 60)
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_age: default_max_age(),
            empty_max_age: default_empty_max_age(),
            stale_revalidate: default_stale_revalidate(),
            stale_error: default_stale_error(),
        }
    }
}

/// Cache-control metadata attached to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheParams {
    /// Fresh window; zero means do not cache.
    pub max_age: Duration,
    /// Stale-revalidate horizon beyond the fresh window.
    pub stale_revalidate: Duration,
    /// Stale-error horizon beyond the fresh window.
    pub stale_error: Duration,
}

impl CacheParams {
    /// Computes the tier for a generic (pre-personalization) result.
    pub fn for_streams(streams: &[StreamEntry], config: &PolicyConfig) -> Self {
        let max_age = if streams.is_empty() {
            config.empty_max_age
        } else if streams.iter().all(StreamEntry::is_failed_access) {
            Duration::ZERO
        } else {
            config.max_age
        };
        Self {
            max_age,
            stale_revalidate: config.stale_revalidate,
            stale_error: config.stale_error,
        }
    }

    /// Whether the result should be stored at all.
    pub fn is_cacheable(&self) -> bool {
        !self.max_age.is_zero()
    }
}
