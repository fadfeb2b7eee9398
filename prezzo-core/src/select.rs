//! Pure selection helpers over already-validated provider rows.

use crate::types::{Candle, Target, VenueTicker};

/// Reduce a window of candles to the requested extreme.
///
/// HIGH is the maximum `high` across every row and LOW the minimum `low`,
/// even when a coarse interval returns several rows. An empty window yields
/// `None`, never a sentinel price. Timestamp-drift checks belong to the
/// caller; this is only the reduction.
#[must_use]
pub fn extreme(candles: &[Candle], target: Target) -> Option<f64> {
    let mut best: Option<f64> = None;
    for candle in candles {
        let value = match target {
            Target::High => candle.high,
            Target::Low => candle.low,
        };
        if !value.is_finite() {
            continue;
        }
        best = Some(match (best, target) {
            (None, _) => value,
            (Some(b), Target::High) => b.max(value),
            (Some(b), Target::Low) => b.min(value),
        });
    }
    best
}

/// Pick the USD price reported by the highest-volume non-stale venue.
///
/// Venues with stale feeds or non-finite fields are dropped before the
/// volume comparison. `None` when nothing usable remains.
#[must_use]
pub fn best_venue_price(venues: &[VenueTicker]) -> Option<f64> {
    venues
        .iter()
        .filter(|v| !v.stale && v.last_usd.is_finite() && v.last_usd > 0.0)
        .filter(|v| v.volume_usd.is_finite())
        .max_by(|a, b| a.volume_usd.total_cmp(&b.volume_usd))
        .map(|v| v.last_usd)
}
