//! prezzo-cryptocompare
//!
//! Historical-OHLCV connector. Serves minute bars where the venue still has
//! them and falls back to hour bars for older instants, reducing the window
//! through the shared extreme selector.
#![warn(missing_docs)]

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use prezzo_core::{
    Candle, CandleInterval, CandleProvider, CandleWindow, ConnectorKey, PriceConnector,
    PrezzoError, Target, TokenSymbol, UtcInstant, extreme,
};

const CONNECTOR_NAME: &str = "prezzo-cryptocompare";

/// Bars fetched per window; the venue returns `limit + 1` data points.
const BAR_LIMIT: u32 = 2;

/// A minute bar further than this from the requested instant means the venue
/// has already aggregated the period away; consult hour bars instead.
const DRIFT_TOLERANCE_MS: i64 = 120_000;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Data", default)]
    data: Option<Payload>,
}

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(rename = "Data", default)]
    rows: Vec<OhlcvRow>,
}

#[derive(Debug, Deserialize)]
struct OhlcvRow {
    time: i64,
    high: f64,
    low: f64,
    open: f64,
    close: f64,
    #[serde(rename = "volumefrom", default)]
    volume: f64,
}

impl OhlcvRow {
    /// Zero-filled rows are the venue's way of reporting an empty period.
    fn is_populated(&self) -> bool {
        self.high > 0.0 && self.low > 0.0
    }

    fn into_candle(self) -> Candle {
        Candle {
            open_time_ms: self.time * 1_000,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// Public connector type backed by the venue's public REST API.
pub struct CryptoCompareConnector {
    http: reqwest::Client,
    base_url: String,
}

/// Builder for [`CryptoCompareConnector`]; tests point `base_url` at a local
/// mock server.
pub struct CryptoCompareBuilder {
    base_url: String,
    http: Option<reqwest::Client>,
    timeout: Duration,
}

impl CryptoCompareBuilder {
    fn new() -> Self {
        Self {
            base_url: "https://min-api.cryptocompare.com".to_string(),
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
    pub fn build(self) -> CryptoCompareConnector {
        let http = self.http.unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .expect("failed to build reqwest client")
        });
        CryptoCompareConnector {
            http,
            base_url: self.base_url,
        }
    }
}

impl CryptoCompareConnector {
    /// Static connector key for resolver priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new(CONNECTOR_NAME);

    /// Start a builder with production defaults.
    #[must_use]
    pub fn builder() -> CryptoCompareBuilder {
        CryptoCompareBuilder::new()
    }

    /// Build against the production API origin.
    #[must_use]
    pub fn new_default() -> Self {
        Self::builder().build()
    }

    fn endpoint(interval: CandleInterval) -> &'static str {
        match interval {
            CandleInterval::M1 => "histominute",
            _ => "histohour",
        }
    }

    async fn window(
        &self,
        token: &TokenSymbol,
        interval: CandleInterval,
        instant: UtcInstant,
    ) -> Result<CandleWindow, PrezzoError> {
        let url = format!("{}/data/v2/{}", self.base_url, Self::endpoint(interval));
        let resp = self
            .http
            .get(&url)
            .query(&[("fsym", token.to_pair_segment().as_str()), ("tsym", "USD")])
            .query(&[("limit", BAR_LIMIT)])
            .query(&[("toTs", instant.as_secs())])
            .send()
            .await
            .map_err(|e| PrezzoError::connector(CONNECTOR_NAME, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PrezzoError::connector(
                CONNECTOR_NAME,
                format!("HTTP {status} for {token}"),
            ));
        }

        let envelope: Envelope = resp
            .json()
            .await
            .map_err(|e| PrezzoError::Data(format!("OHLCV payload for {token}: {e}")))?;
        if envelope.response != "Success" {
            // the venue reports unknown symbols and empty histories in-band
            return Err(PrezzoError::no_data(format!(
                "{token}: {}",
                envelope.message
            )));
        }

        let span_ms = i64::from(BAR_LIMIT) * interval.seconds() * 1_000;
        let candles: Vec<Candle> = envelope
            .data
            .unwrap_or_default()
            .rows
            .into_iter()
            .filter(OhlcvRow::is_populated)
            .map(OhlcvRow::into_candle)
            .collect();
        Ok(CandleWindow {
            interval,
            start_ms: instant.as_millis() - span_ms,
            end_ms: instant.as_millis(),
            candles,
        })
    }

    /// Distance between the bar nearest the instant and the instant itself.
    fn tail_drift_ms(window: &CandleWindow, instant: UtcInstant) -> Option<i64> {
        window
            .candles
            .last()
            .map(|c| (c.open_time_ms - instant.as_millis()).abs())
    }
}

#[async_trait]
impl PriceConnector for CryptoCompareConnector {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn vendor(&self) -> &'static str {
        "CryptoCompare"
    }

    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        Some(self as &dyn CandleProvider)
    }
}

#[async_trait]
impl CandleProvider for CryptoCompareConnector {
    async fn candle_extreme(
        &self,
        token: &TokenSymbol,
        instant: UtcInstant,
        target: Target,
    ) -> Result<f64, PrezzoError> {
        let fine = self.window(token, CandleInterval::M1, instant).await?;
        let usable =
            Self::tail_drift_ms(&fine, instant).is_some_and(|drift| drift <= DRIFT_TOLERANCE_MS);
        let window = if usable {
            fine
        } else {
            debug!(token = %token, "minute bars unavailable, widening to hour bars");
            self.window(token, CandleInterval::H1, instant).await?
        };
        extreme(&window.candles, target)
            .ok_or_else(|| PrezzoError::no_data(format!("no OHLCV rows for {token} around {instant}")))
    }
}
