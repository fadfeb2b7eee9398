use async_trait::async_trait;

use crate::error::PrezzoError;
use crate::types::{Target, TokenSymbol, UtcInstant};
pub use prezzo_types::ConnectorKey;

/// Focused role trait for connectors that can reduce an interval window
/// around an instant to its extreme USD price.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Resolve the requested extreme around `instant`.
    ///
    /// Implementations query a fine-grained window first and fall back to a
    /// coarse one when the fine window is empty or drifted; ordinary absence
    /// is `NoData`, not an HTTP fault.
    async fn candle_extreme(
        &self,
        token: &TokenSymbol,
        instant: UtcInstant,
        target: Target,
    ) -> Result<f64, PrezzoError>;
}

/// Focused role trait for connectors that report a current traded price.
#[async_trait]
pub trait TickerProvider: Send + Sync {
    /// Best current USD price across the asset's trading venues.
    ///
    /// This is current-price semantics. The resolver uses it as an
    /// approximation for past instants once candle-capable providers are
    /// exhausted; the precision trade-off is deliberate.
    async fn ticker_price(&self, token: &TokenSymbol) -> Result<f64, PrezzoError>;
}

/// Focused role trait for connectors that serve periodic historical
/// snapshots.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Extreme over the snapshot period containing `instant`.
    ///
    /// Falls back to the closest prior value when the venue keeps no
    /// extremes for the period.
    async fn snapshot_extreme(
        &self,
        token: &TokenSymbol,
        instant: UtcInstant,
        target: Target,
    ) -> Result<f64, PrezzoError>;
}

/// Main connector trait implemented by provider crates. Exposes capability
/// discovery.
#[async_trait]
pub trait PriceConnector: Send + Sync {
    /// A stable identifier for priority lists (e.g., "prezzo-binance").
    fn name(&self) -> &'static str;

    /// Canonical connector key constructed from the static name.
    ///
    /// Use this helper when configuring the resolver's priority list.
    fn key(&self) -> ConnectorKey {
        ConnectorKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Whether this connector is worth asking about `token` at all.
    ///
    /// Default: every token. The primary venue overrides this with its
    /// never-listed skip set so the resolver saves the round trip.
    fn supports_token(&self, token: &TokenSymbol) -> bool {
        let _ = token;
        true
    }

    /// Advertise candle capability by returning a usable trait object
    /// reference when supported.
    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        None
    }

    /// Advertise ticker capability by returning a usable trait object
    /// reference when supported.
    fn as_ticker_provider(&self) -> Option<&dyn TickerProvider> {
        None
    }

    /// Advertise snapshot capability by returning a usable trait object
    /// reference when supported.
    fn as_snapshot_provider(&self) -> Option<&dyn SnapshotProvider> {
        None
    }
}
