//! Programmable mock connector for tests and examples.
//!
//! Each capability is scripted independently; a capability is advertised iff
//! a script was installed for it. Call counters make "no network access"
//! assertions possible from the outside.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use prezzo_core::{
    Candle, CandleProvider, Clock, PriceConnector, PrezzoError, SnapshotProvider, Target,
    TickerProvider, TokenSymbol, UtcInstant, extreme,
};

/// One scripted reply for a capability.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Return this price directly.
    Price(f64),
    /// Reduce this window through the extreme selector, like a real candle
    /// adapter would.
    Window(Vec<Candle>),
    /// Report ordinary absence.
    NoData,
    /// Fail transiently, as a venue-side error would.
    Transient,
    /// Never answer; exercises the caller's provider timeout.
    Hang,
}

/// Deterministic connector whose capabilities follow installed scripts.
pub struct MockConnector {
    name: &'static str,
    candle: Option<Scripted>,
    ticker: Option<Scripted>,
    snapshot: Option<Scripted>,
    rejected_tokens: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl MockConnector {
    /// Start an empty mock with no capabilities advertised.
    #[must_use]
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            candle: None,
            ticker: None,
            snapshot: None,
            rejected_tokens: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Install the candle-capability script.
    #[must_use]
    pub fn with_candles(mut self, script: Scripted) -> Self {
        self.candle = Some(script);
        self
    }

    /// Install the ticker-capability script.
    #[must_use]
    pub fn with_ticker(mut self, script: Scripted) -> Self {
        self.ticker = Some(script);
        self
    }

    /// Install the snapshot-capability script.
    #[must_use]
    pub fn with_snapshot(mut self, script: Scripted) -> Self {
        self.snapshot = Some(script);
        self
    }

    /// Declare a token this connector reports as unsupported.
    #[must_use]
    pub fn rejecting_token(mut self, token: &str) -> Self {
        self.rejected_tokens.push(token.to_ascii_lowercase());
        self
    }

    /// Number of capability calls served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Counter handle that stays valid after the connector moves into an
    /// `Arc<dyn PriceConnector>`.
    #[must_use]
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    async fn run(&self, script: &Scripted, target: Target) -> Result<f64, PrezzoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match script {
            Scripted::Price(p) => Ok(*p),
            Scripted::Window(candles) => extreme(candles, target)
                .ok_or_else(|| PrezzoError::no_data(format!("{}: empty window", self.name))),
            Scripted::NoData => Err(PrezzoError::no_data(format!("{}: scripted absence", self.name))),
            Scripted::Transient => Err(PrezzoError::connector(self.name, "scripted transient failure")),
            Scripted::Hang => {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Err(PrezzoError::connector(self.name, "unreachable"))
            }
        }
    }
}

#[async_trait]
impl PriceConnector for MockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn supports_token(&self, token: &TokenSymbol) -> bool {
        !self.rejected_tokens.iter().any(|t| t == token.as_str())
    }

    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        self.candle.as_ref().map(|_| self as &dyn CandleProvider)
    }

    fn as_ticker_provider(&self) -> Option<&dyn TickerProvider> {
        self.ticker.as_ref().map(|_| self as &dyn TickerProvider)
    }

    fn as_snapshot_provider(&self) -> Option<&dyn SnapshotProvider> {
        self.snapshot.as_ref().map(|_| self as &dyn SnapshotProvider)
    }
}

#[async_trait]
impl CandleProvider for MockConnector {
    async fn candle_extreme(
        &self,
        _token: &TokenSymbol,
        _instant: UtcInstant,
        target: Target,
    ) -> Result<f64, PrezzoError> {
        let script = self
            .candle
            .as_ref()
            .ok_or(PrezzoError::unsupported("candles"))?;
        self.run(script, target).await
    }
}

#[async_trait]
impl TickerProvider for MockConnector {
    async fn ticker_price(&self, _token: &TokenSymbol) -> Result<f64, PrezzoError> {
        let script = self
            .ticker
            .as_ref()
            .ok_or(PrezzoError::unsupported("tickers"))?;
        // tickers carry no target; HIGH is an arbitrary fixed reduction
        self.run(script, Target::High).await
    }
}

#[async_trait]
impl SnapshotProvider for MockConnector {
    async fn snapshot_extreme(
        &self,
        _token: &TokenSymbol,
        _instant: UtcInstant,
        target: Target,
    ) -> Result<f64, PrezzoError> {
        let script = self
            .snapshot
            .as_ref()
            .ok_or(PrezzoError::unsupported("snapshots"))?;
        self.run(script, target).await
    }
}

/// Clock pinned to a fixed instant, for deterministic future-date checks.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}
