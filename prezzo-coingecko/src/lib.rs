//! prezzo-coingecko
//!
//! Aggregator connector with two capabilities:
//!
//! - tickers: the best current USD price across the asset's trading venues,
//!   used as a deliberate approximation for past instants once the
//!   candle-capable venues are exhausted;
//! - snapshots: a day-window of periodic price points around the instant,
//!   the last-resort path.
#![warn(missing_docs)]

mod ids;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use prezzo_core::{
    ConnectorKey, PriceConnector, PrezzoError, SnapshotProvider, Target, TickerProvider,
    TokenSymbol, UtcInstant, VenueTicker, best_venue_price,
};

const CONNECTOR_NAME: &str = "prezzo-coingecko";

/// Full fetch span around the instant, seconds. The venue serves hourly
/// points for windows of this size.
const SNAPSHOT_FETCH_HALF_SPAN_SECS: i64 = 86_400;

/// Points within this narrower span count as "the period containing the
/// instant"; outside it only the closest-prior fallback applies.
const SNAPSHOT_WINDOW_HALF_SPAN_MS: i64 = 12 * 3_600 * 1_000;

#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(default)]
    tickers: Vec<TickerEntry>,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    market: Market,
    #[serde(default)]
    converted_last: Quotes,
    #[serde(default)]
    converted_volume: Quotes,
    #[serde(default)]
    is_stale: bool,
}

#[derive(Debug, Deserialize)]
struct Market {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Quotes {
    #[serde(default)]
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(i64, f64)>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    symbol: String,
}

/// Public connector type backed by the aggregator's public REST API.
pub struct CoinGeckoConnector {
    http: reqwest::Client,
    base_url: String,
}

/// Builder for [`CoinGeckoConnector`]; tests point `base_url` at a local mock
/// server.
pub struct CoinGeckoBuilder {
    base_url: String,
    http: Option<reqwest::Client>,
    timeout: Duration,
}

impl CoinGeckoBuilder {
    fn new() -> Self {
        Self {
            base_url: "https://api.coingecko.com".to_string(),
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
    pub fn build(self) -> CoinGeckoConnector {
        let http = self.http.unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .expect("failed to build reqwest client")
        });
        CoinGeckoConnector {
            http,
            base_url: self.base_url,
        }
    }
}

impl CoinGeckoConnector {
    /// Static connector key for resolver priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new(CONNECTOR_NAME);

    /// Start a builder with production defaults.
    #[must_use]
    pub fn builder() -> CoinGeckoBuilder {
        CoinGeckoBuilder::new()
    }

    /// Build against the production API origin.
    #[must_use]
    pub fn new_default() -> Self {
        Self::builder().build()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PrezzoError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| PrezzoError::connector(CONNECTOR_NAME, e.to_string()))?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PrezzoError::no_data(format!("{path} is unknown upstream")));
        }
        if !status.is_success() {
            return Err(PrezzoError::connector(
                CONNECTOR_NAME,
                format!("HTTP {status} for {path}"),
            ));
        }
        resp.json::<T>()
            .await
            .map_err(|e| PrezzoError::Data(format!("payload for {path}: {e}")))
    }

    /// Resolve the aggregator's coin id for a token symbol.
    ///
    /// Majors come from a static map; everything else goes through the
    /// venue's search endpoint and must match the symbol exactly.
    async fn coin_id(&self, token: &TokenSymbol) -> Result<String, PrezzoError> {
        if let Some(id) = ids::lookup(token.as_str()) {
            return Ok(id.to_string());
        }
        let found: SearchResponse = self
            .get_json("/api/v3/search", &[("query", token.as_str().to_string())])
            .await?;
        found
            .coins
            .into_iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(token.as_str()))
            .map(|c| c.id)
            .ok_or_else(|| PrezzoError::no_data(format!("no coin id for {token}")))
    }
}

#[async_trait]
impl PriceConnector for CoinGeckoConnector {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn vendor(&self) -> &'static str {
        "CoinGecko"
    }

    fn as_ticker_provider(&self) -> Option<&dyn TickerProvider> {
        Some(self as &dyn TickerProvider)
    }

    fn as_snapshot_provider(&self) -> Option<&dyn SnapshotProvider> {
        Some(self as &dyn SnapshotProvider)
    }
}

#[async_trait]
impl TickerProvider for CoinGeckoConnector {
    async fn ticker_price(&self, token: &TokenSymbol) -> Result<f64, PrezzoError> {
        let id = self.coin_id(token).await?;
        let listed: TickersResponse = self
            .get_json(&format!("/api/v3/coins/{id}/tickers"), &[])
            .await?;

        let venues: Vec<VenueTicker> = listed
            .tickers
            .into_iter()
            .filter_map(|t| {
                let last_usd = t.converted_last.usd?;
                Some(VenueTicker {
                    venue: t.market.name,
                    last_usd,
                    volume_usd: t.converted_volume.usd.unwrap_or(0.0),
                    stale: t.is_stale,
                })
            })
            .collect();
        debug!(token = %token, venues = venues.len(), "ranking ticker venues");
        best_venue_price(&venues)
            .ok_or_else(|| PrezzoError::no_data(format!("no live venue quotes for {token}")))
    }
}

#[async_trait]
impl SnapshotProvider for CoinGeckoConnector {
    async fn snapshot_extreme(
        &self,
        token: &TokenSymbol,
        instant: UtcInstant,
        target: Target,
    ) -> Result<f64, PrezzoError> {
        let id = self.coin_id(token).await?;
        let from = instant.as_secs() - SNAPSHOT_FETCH_HALF_SPAN_SECS;
        let to = instant.as_secs() + SNAPSHOT_FETCH_HALF_SPAN_SECS;
        let chart: MarketChart = self
            .get_json(
                &format!("/api/v3/coins/{id}/market_chart/range"),
                &[
                    ("vs_currency", "usd".to_string()),
                    ("from", from.to_string()),
                    ("to", to.to_string()),
                ],
            )
            .await?;

        let center = instant.as_millis();
        let in_window: Vec<f64> = chart
            .prices
            .iter()
            .filter(|(ts, _)| (ts - center).abs() <= SNAPSHOT_WINDOW_HALF_SPAN_MS)
            .map(|(_, price)| *price)
            .filter(|p| p.is_finite())
            .collect();

        let picked = match target {
            Target::High => in_window.iter().copied().fold(None, |acc: Option<f64>, p| {
                Some(acc.map_or(p, |a| a.max(p)))
            }),
            Target::Low => in_window.iter().copied().fold(None, |acc: Option<f64>, p| {
                Some(acc.map_or(p, |a| a.min(p)))
            }),
        };
        if let Some(price) = picked {
            return Ok(price);
        }

        // nothing inside the period; fall back to the closest prior point,
        // which behaves like a closing price
        debug!(token = %token, "no points in period, using closest prior point");
        chart
            .prices
            .iter()
            .filter(|(ts, _)| *ts <= center)
            .max_by_key(|(ts, _)| *ts)
            .map(|(_, price)| *price)
            .filter(|p| p.is_finite())
            .ok_or_else(|| PrezzoError::no_data(format!("no snapshot points for {token}")))
    }
}
