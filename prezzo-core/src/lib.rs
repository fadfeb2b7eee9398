//! prezzo-core
//!
//! Core types, traits, and utilities shared across the prezzo ecosystem.
//!
//! - `types`: common data structures (token symbols, queries, candles).
//! - `time`: strict calendar parsing and fixed-offset timezone normalization.
//! - `select`: pure reductions over candle windows and venue tickers.
//! - `connector`: the `PriceConnector` trait and capability provider traits.
//! - `error`: the unified `PrezzoError` taxonomy.
#![warn(missing_docs)]

/// Connector capability traits and the primary `PriceConnector` interface.
pub mod connector;
/// Unified error type for the workspace.
pub mod error;
/// Pure selection helpers over candle and ticker rows.
pub mod select;
/// Calendar parsing, timezone offsets, and clock abstraction.
pub mod time;
/// Common data structures.
pub mod types;

pub use connector::{
    CandleProvider, ConnectorKey, PriceConnector, SnapshotProvider, TickerProvider,
};
pub use error::{InputErrorKind, PrezzoError};
pub use select::{best_venue_price, extreme};
pub use time::{
    CalendarStamp, Clock, DateInput, SystemClock, ensure_not_future, normalize, zone_offset_secs,
};
pub use types::{
    Candle, CandleInterval, CandleWindow, PriceQuery, Target, TokenSymbol, UtcInstant, VenueTicker,
};
