//! Configuration types shared between the resolver and its middleware layers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConnectorKey;

/// TTL and capacity settings for the resolution cache.
///
/// Resolved prices live under the long positive TTL; confirmed absences use
/// the shorter negative TTL so a transient provider outage is retried well
/// before a genuinely-absent listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for successfully resolved prices.
    pub positive_ttl: Duration,
    /// Time-to-live for confirmed-absence entries.
    pub negative_ttl: Duration,
    /// Maximum number of entries kept per store.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            positive_ttl: Duration::from_secs(6 * 60 * 60),
            negative_ttl: Duration::from_secs(10 * 60),
            max_entries: 10_000,
        }
    }
}

/// Minimum spacing policy for outbound provider calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Minimum interval between two consecutive outbound calls.
    pub min_interval: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(1_500),
        }
    }
}

/// Exponential backoff schedule for retrying pacing-guard acquisition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Exponential factor applied per retry (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
    /// Total acquisition attempts before giving up.
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 5_000,
            max_delay_ms: 20_000,
            factor: 2,
            jitter_percent: 20,
            max_attempts: 3,
        }
    }
}

/// Global configuration for the price resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Preferred connector ordering. Listed connectors come first, in list
    /// order; unlisted connectors keep their registration order after them.
    pub priority: Vec<ConnectorKey>,
    /// Timeout for an individual provider call.
    pub provider_timeout: Duration,
    /// Upper bound on a single pacing-guard acquisition attempt.
    pub acquire_timeout: Duration,
    /// Retry schedule wrapped around pacing-guard acquisition.
    pub backoff: BackoffConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            priority: Vec::new(),
            provider_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(5),
            backoff: BackoffConfig::default(),
        }
    }
}
