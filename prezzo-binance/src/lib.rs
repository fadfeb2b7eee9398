//! prezzo-binance
//!
//! Primary candle-interval connector. Resolves a token's USD extreme from the
//! venue's klines, preferring the direct stable-quote pair and falling back
//! to a bridge-asset conversion when the token only trades against BTC.
#![warn(missing_docs)]

mod klines;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use klines::KlineService;
use prezzo_core::{
    CandleInterval, CandleProvider, ConnectorKey, PriceConnector, PrezzoError, Target, TokenSymbol,
    UtcInstant, extreme,
};

pub(crate) const CONNECTOR_NAME: &str = "prezzo-binance";

/// Tokens known never to be listed against the stable quote; skipping them
/// saves the resolver one wasted round trip.
const NEVER_LISTED: &[&str] = &["usdt", "usdc", "dai", "tusd", "usd", "eur"];

const STABLE_QUOTE: &str = "USDT";
const BRIDGE_QUOTE: &str = "BTC";
const BRIDGE_PAIR: &str = "BTCUSDT";

const FINE_INTERVAL: CandleInterval = CandleInterval::M1;
const FINE_HALF_WIDTH_MS: i64 = 60_000;
const COARSE_INTERVAL: CandleInterval = CandleInterval::H1;
const COARSE_HALF_WIDTH_MS: i64 = 3_600_000;

/// A fine candle whose open time drifts further than this from the requested
/// instant is distrusted and the coarse window consulted instead.
const DRIFT_TOLERANCE_MS: i64 = 120_000;

/// Public connector type backed by the venue's public REST API.
pub struct BinanceConnector {
    klines: KlineService,
}

/// Builder for [`BinanceConnector`]; tests point `base_url` at a local mock
/// server.
pub struct BinanceBuilder {
    base_url: String,
    http: Option<reqwest::Client>,
    timeout: Duration,
}

impl BinanceBuilder {
    fn new() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            http: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the API origin (no trailing slash required).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Supply a preconfigured HTTP client.
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Per-request timeout used when the builder constructs its own client.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the connector.
    ///
    /// # Panics
    /// Panics if the underlying HTTP client cannot be constructed, which is
    /// unexpected in normal environments.
    #[must_use]
    pub fn build(self) -> BinanceConnector {
        let http = self.http.unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .expect("failed to build reqwest client")
        });
        BinanceConnector {
            klines: KlineService::new(http, self.base_url),
        }
    }
}

impl BinanceConnector {
    /// Static connector key for resolver priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new(CONNECTOR_NAME);

    /// Start a builder with production defaults.
    #[must_use]
    pub fn builder() -> BinanceBuilder {
        BinanceBuilder::new()
    }

    /// Build against the production API origin.
    #[must_use]
    pub fn new_default() -> Self {
        Self::builder().build()
    }

    /// Extreme over the fine window, or over the coarse window when the fine
    /// one is empty or its first candle drifted past the tolerance.
    async fn window_extreme(
        &self,
        pair: &str,
        instant: UtcInstant,
        target: Target,
    ) -> Result<Option<f64>, PrezzoError> {
        let fine = self
            .klines
            .window(pair, FINE_INTERVAL, instant, FINE_HALF_WIDTH_MS)
            .await?;
        let usable = fine
            .lead_drift_ms(instant)
            .is_some_and(|drift| drift <= DRIFT_TOLERANCE_MS);
        let window = if usable {
            fine
        } else {
            debug!(pair, "fine window empty or drifted, widening to coarse interval");
            self.klines
                .window(pair, COARSE_INTERVAL, instant, COARSE_HALF_WIDTH_MS)
                .await?
        };
        Ok(extreme(&window.candles, target))
    }

    /// Close of the first candle near `instant`, used for the bridge-asset
    /// USD conversion.
    async fn window_close(
        &self,
        pair: &str,
        instant: UtcInstant,
    ) -> Result<Option<f64>, PrezzoError> {
        let fine = self
            .klines
            .window(pair, FINE_INTERVAL, instant, FINE_HALF_WIDTH_MS)
            .await?;
        let window = if fine.is_empty() {
            self.klines
                .window(pair, COARSE_INTERVAL, instant, COARSE_HALF_WIDTH_MS)
                .await?
        } else {
            fine
        };
        Ok(window.candles.first().map(|c| c.close))
    }
}

#[async_trait]
impl PriceConnector for BinanceConnector {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn vendor(&self) -> &'static str {
        "Binance"
    }

    fn supports_token(&self, token: &TokenSymbol) -> bool {
        !NEVER_LISTED.contains(&token.as_str())
    }

    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        Some(self as &dyn CandleProvider)
    }
}

#[async_trait]
impl CandleProvider for BinanceConnector {
    async fn candle_extreme(
        &self,
        token: &TokenSymbol,
        instant: UtcInstant,
        target: Target,
    ) -> Result<f64, PrezzoError> {
        let base = token.to_pair_segment();
        let direct = format!("{base}{STABLE_QUOTE}");

        match self.window_extreme(&direct, instant, target).await {
            Ok(Some(price)) => return Ok(price),
            Ok(None) => {
                return Err(PrezzoError::no_data(format!(
                    "no candles for {direct} around {instant}"
                )));
            }
            Err(PrezzoError::NoData { .. }) => {
                debug!(token = %token, "no stable-quote pair, trying the bridge route");
            }
            Err(other) => return Err(other),
        }

        // bridge: extreme in BTC times the BTC/USD close for the same window
        let bridged = format!("{base}{BRIDGE_QUOTE}");
        let in_btc = self
            .window_extreme(&bridged, instant, target)
            .await?
            .ok_or_else(|| {
                PrezzoError::no_data(format!("no candles for {bridged} around {instant}"))
            })?;
        let btc_usd = self
            .window_close(BRIDGE_PAIR, instant)
            .await?
            .ok_or_else(|| {
                PrezzoError::no_data(format!("no {BRIDGE_PAIR} close around {instant}"))
            })?;
        Ok(in_btc * btc_usd)
    }
}
