//! Common data structures shared by the resolver and its connectors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrezzoError;
use crate::time::DateInput;

/// Canonical token identifier: lowercase ASCII alphanumeric.
///
/// Construction canonicalizes, so `"XMR"`, `"xmr"` and `" Xmr "` all name the
/// same token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSymbol(String);

impl TokenSymbol {
    /// Canonicalize a raw symbol.
    ///
    /// # Errors
    /// Returns `InvalidInput` for empty or non-alphanumeric input.
    pub fn new(raw: &str) -> Result<Self, PrezzoError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PrezzoError::argument(format!(
                "token symbol {raw:?} must be non-empty ASCII alphanumeric"
            )));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// The canonical lowercase form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase rendering for venues that key trading pairs that way.
    #[must_use]
    pub fn to_pair_segment(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which extreme of the interval window the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// The maximum traded price over the window.
    High,
    /// The minimum traded price over the window.
    Low,
}

impl Target {
    /// Lowercase label, e.g. for cache keys and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

/// An absolute UTC instant in epoch milliseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct UtcInstant(pub i64);

impl UtcInstant {
    /// Epoch milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Epoch seconds, truncating.
    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.0.div_euclid(1_000)
    }
}

impl fmt::Display for UtcInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// One OHLC aggregate for a trading pair over a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Interval open time in epoch milliseconds.
    pub open_time_ms: i64,
    /// Opening price.
    pub open: f64,
    /// Highest traded price in the interval.
    pub high: f64,
    /// Lowest traded price in the interval.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Base-asset volume.
    pub volume: f64,
}

/// Interval granularities a candle-capable connector may query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleInterval {
    /// One minute.
    M1,
    /// One hour.
    H1,
    /// One day.
    D1,
}

impl CandleInterval {
    /// Interval length in seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::H1 => 3_600,
            Self::D1 => 86_400,
        }
    }

    /// Conventional short label ("1m", "1h", "1d").
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::H1 => "1h",
            Self::D1 => "1d",
        }
    }
}

/// Transient window of candles fetched for a single provider call.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    /// Granularity of the rows.
    pub interval: CandleInterval,
    /// Window start, epoch milliseconds (inclusive).
    pub start_ms: i64,
    /// Window end, epoch milliseconds (inclusive).
    pub end_ms: i64,
    /// Rows in ascending open-time order.
    pub candles: Vec<Candle>,
}

impl CandleWindow {
    /// Whether the provider returned no rows for the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Absolute distance between the first row's open time and `instant`.
    ///
    /// `None` when the window is empty. Callers use this to decide whether a
    /// fine-grained window drifted too far from the requested instant.
    #[must_use]
    pub fn lead_drift_ms(&self, instant: UtcInstant) -> Option<i64> {
        self.candles
            .first()
            .map(|c| (c.open_time_ms - instant.as_millis()).abs())
    }
}

/// One venue's quote as reported by a ticker-snapshot provider.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueTicker {
    /// Venue name, e.g. "Kraken".
    pub venue: String,
    /// Last traded price converted to USD.
    pub last_usd: f64,
    /// 24h traded volume converted to USD.
    pub volume_usd: f64,
    /// Whether the venue's feed is flagged stale.
    pub stale: bool,
}

/// A single historical price request.
#[derive(Debug, Clone)]
pub struct PriceQuery {
    /// Token to resolve.
    pub token: TokenSymbol,
    /// The local or absolute date representation.
    pub date: DateInput,
    /// Timezone abbreviation the date components are expressed in.
    pub tz_label: String,
    /// Which extreme to resolve.
    pub target: Target,
}

impl PriceQuery {
    /// Build a query, canonicalizing the token symbol.
    ///
    /// # Errors
    /// Returns `InvalidInput` when the token symbol is rejected.
    pub fn new(
        token: &str,
        date: DateInput,
        tz_label: &str,
        target: Target,
    ) -> Result<Self, PrezzoError> {
        Ok(Self {
            token: TokenSymbol::new(token)?,
            date,
            tz_label: tz_label.trim().to_string(),
            target,
        })
    }
}
