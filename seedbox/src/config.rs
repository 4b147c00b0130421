//! Service configuration.

use std::time::Duration;

use seedbox_core::PolicyConfig;
use serde::{Deserialize, Serialize};

fn default_max_concurrent() -> usize {
    10
}

fn default_queue_size() -> usize {
    30
}

/// Top-level configuration for [`StreamService`](crate::StreamService).
///
/// Durations deserialize from human-readable strings (`"1h"`, `"30s"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upstream fetches allowed to run at once.
    pub max_concurrent: usize,
    /// Fetches allowed to wait for a slot before new ones are rejected.
    pub queue_size: usize,
    /// Cache TTL policy.
    pub policy: PolicyConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_size: default_queue_size(),
            policy: PolicyConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Combined fresh + stale-error window, the longest an entry can serve.
    pub fn max_retention(&self) -> Duration {
        self.policy.max_age + self.policy.stale_error
    }
}
