//! Prezzo resolves "what was the USD price (high or low) of token T at
//! instant S?" across an ordered cascade of market-data providers.
//!
//! Overview
//! - Normalizes a local calendar stamp plus timezone abbreviation into one
//!   absolute UTC instant, rejecting malformed and future inputs up front.
//! - Checks the resolution cache; positive and negative hits short-circuit
//!   all network access.
//! - Takes the pacing guard (mutual exclusion + minimum call spacing) with a
//!   bounded backoff retry, then walks the registered connectors in priority
//!   order; the first usable price wins.
//! - Caches the outcome: prices under a long TTL, confirmed absence under a
//!   short one. A busy guard is never cached.
//!
//! Key behaviors and trade-offs
//! - First-wins fallback: the resolver never aggregates or averages across
//!   providers; cheaper and deterministic, at the cost of provider-dependent
//!   precision.
//! - Ticker fallback: once candle-capable venues are exhausted, a current
//!   ticker price stands in for the historical value. A documented
//!   approximation, not a defect.
//! - The pacing guard serializes outbound calls process-wide when shared
//!   across resolvers; suspensions happen only while holding or waiting for
//!   the guard.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use prezzo::{CalendarStamp, DateInput, Prezzo, PriceQuery, Target};
//!
//! let prezzo = Prezzo::builder()
//!     .with_connector(Arc::new(prezzo_binance::BinanceConnector::new_default()))
//!     .with_connector(Arc::new(prezzo_coingecko::CoinGeckoConnector::new_default()))
//!     .build()?;
//!
//! let query = PriceQuery::new(
//!     "xmr",
//!     DateInput::Components(CalendarStamp::parse("2025-12-09 22:46:02")?),
//!     "CST",
//!     Target::High,
//! )?;
//! let price = prezzo.resolve(&query).await?;
//! ```
//!
//! See `prezzo/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

mod backoff;
pub(crate) mod core;
mod resolver;

pub use crate::core::{Prezzo, PrezzoBuilder};

// Re-export core types for convenience
pub use prezzo_core::{
    CalendarStamp,
    Candle,
    CandleInterval,
    CandleWindow,
    Clock,
    DateInput,
    InputErrorKind,
    PriceConnector,
    PriceQuery,
    PrezzoError,
    SystemClock,
    Target,
    TokenSymbol,
    UtcInstant,
    VenueTicker,
};

pub use prezzo_types::{BackoffConfig, CacheConfig, ConnectorKey, PacingConfig, ResolverConfig};

pub use prezzo_middleware::{CacheKey, Lookup, PacingGuard, ResolutionCache};
