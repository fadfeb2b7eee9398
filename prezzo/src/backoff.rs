//! Bounded exponential backoff with jitter for pacing-guard retries.

use std::time::Duration;

use rand::Rng;

use prezzo_types::BackoffConfig;

/// Delay before retry number `attempt` (zero-based): base * factor^attempt,
/// capped, plus random jitter to spread synchronized callers.
pub(crate) fn delay_for_attempt(cfg: &BackoffConfig, attempt: u32) -> Duration {
    let factor = u64::from(cfg.factor.max(1));
    let base = cfg
        .base_delay_ms
        .saturating_mul(factor.saturating_pow(attempt))
        .min(cfg.max_delay_ms);
    let span = base / 100 * u64::from(cfg.jitter_percent.min(100));
    let jitter = if span == 0 {
        0
    } else {
        rand::rng().random_range(0..=span)
    };
    Duration::from_millis(base.saturating_add(jitter))
}
