//! HTTP access to the venue's kline endpoint and row decoding.

use serde::Deserialize;
use serde_json::Value;

use prezzo_core::{Candle, CandleInterval, CandleWindow, PrezzoError, UtcInstant};

use crate::CONNECTOR_NAME;

/// Venue error code for a trading pair that does not exist.
const UNKNOWN_SYMBOL_CODE: i64 = -1121;

/// Upper bound on rows per window; both windows fit comfortably below it.
const ROW_LIMIT: u32 = 8;

#[derive(Debug, Default, Deserialize)]
struct VenueError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
}

pub(crate) struct KlineService {
    http: reqwest::Client,
    base_url: String,
}

impl KlineService {
    pub(crate) fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Fetch one interval window of klines for `pair`.
    ///
    /// An unknown trading pair is `NoData` (the caller may have a bridge
    /// route left to try); transport and server trouble is `Connector`.
    pub(crate) async fn window(
        &self,
        pair: &str,
        interval: CandleInterval,
        instant: UtcInstant,
        half_width_ms: i64,
    ) -> Result<CandleWindow, PrezzoError> {
        let start_ms = instant.as_millis() - half_width_ms;
        let end_ms = instant.as_millis() + half_width_ms;
        let url = format!("{}/api/v3/klines", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("symbol", pair), ("interval", interval.as_str())])
            .query(&[("startTime", start_ms), ("endTime", end_ms)])
            .query(&[("limit", ROW_LIMIT)])
            .send()
            .await
            .map_err(|e| PrezzoError::connector(CONNECTOR_NAME, e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let body: VenueError = resp.json().await.unwrap_or_default();
            if body.code == UNKNOWN_SYMBOL_CODE {
                return Err(PrezzoError::no_data(format!("pair {pair} is not listed")));
            }
            return Err(PrezzoError::connector(
                CONNECTOR_NAME,
                format!("HTTP 400 for {pair}: {}", body.msg),
            ));
        }
        if !status.is_success() {
            return Err(PrezzoError::connector(
                CONNECTOR_NAME,
                format!("HTTP {status} for {pair}"),
            ));
        }

        let rows: Vec<Vec<Value>> = resp
            .json()
            .await
            .map_err(|e| PrezzoError::Data(format!("kline payload for {pair}: {e}")))?;
        let candles = rows
            .iter()
            .map(|row| decode_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CandleWindow {
            interval,
            start_ms,
            end_ms,
            candles,
        })
    }
}

/// Decode one positional kline row:
/// `[open_time, open, high, low, close, volume, close_time, ...]` with the
/// prices serialized as decimal strings.
fn decode_row(row: &[Value]) -> Result<Candle, PrezzoError> {
    if row.len() < 6 {
        return Err(PrezzoError::Data(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }
    let open_time_ms = row[0]
        .as_i64()
        .ok_or_else(|| PrezzoError::Data("kline open time is not an integer".to_string()))?;
    let price = |idx: usize, field: &str| -> Result<f64, PrezzoError> {
        row[idx]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| PrezzoError::Data(format!("kline field {field} is not a decimal string")))
    };
    Ok(Candle {
        open_time_ms,
        open: price(1, "open")?,
        high: price(2, "high")?,
        low: price(3, "low")?,
        close: price(4, "close")?,
        volume: price(5, "volume")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_parses_decimal_strings() {
        let row = json!([
            1_733_804_760_000_i64,
            "189.00",
            "191.20",
            "189.00",
            "190.10",
            "12.5",
            1_733_804_819_999_i64,
            "2376.25",
            42,
            "6.0",
            "1140.6",
            "0"
        ]);
        let candle = decode_row(row.as_array().unwrap()).unwrap();
        assert_eq!(candle.open_time_ms, 1_733_804_760_000);
        assert_eq!(candle.high, 191.20);
        assert_eq!(candle.low, 189.00);
    }

    #[test]
    fn short_or_mistyped_rows_are_data_errors() {
        let short = json!([1_733_804_760_000_i64, "1.0"]);
        assert!(matches!(
            decode_row(short.as_array().unwrap()),
            Err(PrezzoError::Data(_))
        ));

        let mistyped = json!([1_733_804_760_000_i64, 189.0, 191.2, 189.0, 190.1, 12.5]);
        assert!(matches!(
            decode_row(mistyped.as_array().unwrap()),
            Err(PrezzoError::Data(_))
        ));
    }
}
