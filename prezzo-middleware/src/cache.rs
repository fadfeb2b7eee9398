//! Resolution cache: memoizes resolved prices and confirmed absences.

use moka::future::Cache;
use tracing::debug;

use prezzo_core::{Target, TokenSymbol, UtcInstant};
use prezzo_types::CacheConfig;

/// Cache discriminator for one resolution.
///
/// The target is part of the key so HIGH and LOW for the same instant never
/// collide. The instant is truncated to minute granularity so re-issued
/// queries for the same minute land on a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    token: String,
    minute_ms: i64,
    tz_label: String,
    target: Target,
}

impl CacheKey {
    const MINUTE_MS: i64 = 60_000;

    /// Derive the key from the canonicalized query parts.
    #[must_use]
    pub fn new(token: &TokenSymbol, instant: UtcInstant, tz_label: &str, target: Target) -> Self {
        Self {
            token: token.as_str().to_string(),
            minute_ms: instant.as_millis().div_euclid(Self::MINUTE_MS) * Self::MINUTE_MS,
            tz_label: tz_label.trim().to_ascii_uppercase(),
            target,
        }
    }
}

/// Outcome of a cache probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup {
    /// A previously resolved price.
    Price(f64),
    /// A previously confirmed absence, still within its shorter TTL.
    NegativeHit,
    /// Nothing usable stored.
    Miss,
}

/// Two-store cache: resolved prices under a long TTL, confirmed absences
/// under a short one.
///
/// Entries are owned exclusively by the cache and expire only by TTL; there
/// is no external eviction surface.
pub struct ResolutionCache {
    prices: Cache<CacheKey, f64>,
    absences: Cache<CacheKey, ()>,
}

impl ResolutionCache {
    /// Build both stores from the shared configuration.
    #[must_use]
    pub fn new(cfg: &CacheConfig) -> Self {
        Self {
            prices: Cache::builder()
                .max_capacity(cfg.max_entries)
                .time_to_live(cfg.positive_ttl)
                .build(),
            absences: Cache::builder()
                .max_capacity(cfg.max_entries)
                .time_to_live(cfg.negative_ttl)
                .build(),
        }
    }

    /// Probe both stores.
    ///
    /// A stored price that fails validation (non-finite or non-positive) is
    /// treated as a miss and evicted rather than surfaced as an error.
    pub async fn get(&self, key: &CacheKey) -> Lookup {
        if let Some(price) = self.prices.get(key).await {
            if price.is_finite() && price > 0.0 {
                return Lookup::Price(price);
            }
            debug!(token = %key.token, "evicting unusable cached value");
            self.prices.invalidate(key).await;
        }
        if self.absences.get(key).await.is_some() {
            return Lookup::NegativeHit;
        }
        Lookup::Miss
    }

    /// Record a resolved price; clears any absence marker left for the key.
    pub async fn put_price(&self, key: CacheKey, price: f64) {
        self.absences.invalidate(&key).await;
        self.prices.insert(key, price).await;
    }

    /// Record a confirmed absence under the shorter negative TTL.
    pub async fn put_negative(&self, key: CacheKey) {
        self.absences.insert(key, ()).await;
    }
}
