use httpmock::prelude::*;
use serde_json::json;

use prezzo_coingecko::CoinGeckoConnector;
use prezzo_core::{PrezzoError, TickerProvider, TokenSymbol};

fn connector(server: &MockServer) -> CoinGeckoConnector {
    CoinGeckoConnector::builder().base_url(server.base_url()).build()
}

fn token(s: &str) -> TokenSymbol {
    TokenSymbol::new(s).unwrap()
}

fn ticker(venue: &str, last: f64, volume: f64, stale: bool) -> serde_json::Value {
    json!({
        "market": { "name": venue },
        "converted_last": { "usd": last },
        "converted_volume": { "usd": volume },
        "is_stale": stale
    })
}

// Ticker prices are current-price semantics. The resolver knowingly uses
// them as an approximation for past instants, so these tests pin venue
// selection, not historical accuracy.
#[tokio::test]
async fn highest_volume_live_venue_wins() {
    let server = MockServer::start_async().await;
    let tickers = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/coins/monero/tickers");
            then.status(200).json_body(json!({
                "tickers": [
                    ticker("ThinVenue", 190.85, 40_000.0, false),
                    ticker("StaleWhale", 170.00, 9_000_000.0, true),
                    ticker("DeepBook", 191.05, 5_200_000.0, false),
                ]
            }));
        })
        .await;

    let c = connector(&server);
    let price = c.ticker_price(&token("xmr")).await.unwrap();
    assert_eq!(price, 191.05);
    assert_eq!(tickers.hits_async().await, 1);
}

#[tokio::test]
async fn venues_without_usd_conversion_are_ignored() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/coins/monero/tickers");
            then.status(200).json_body(json!({
                "tickers": [
                    { "market": { "name": "NoUsd" }, "converted_last": {}, "converted_volume": {}, "is_stale": false },
                    ticker("Usable", 190.40, 1_000.0, false),
                ]
            }));
        })
        .await;

    let c = connector(&server);
    assert_eq!(c.ticker_price(&token("xmr")).await.unwrap(), 190.40);
}

#[tokio::test]
async fn all_stale_venues_is_no_data() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/coins/monero/tickers");
            then.status(200).json_body(json!({
                "tickers": [ticker("Old", 100.0, 500.0, true)]
            }));
        })
        .await;

    let c = connector(&server);
    let err = c.ticker_price(&token("xmr")).await.unwrap_err();
    assert!(matches!(err, PrezzoError::NoData { .. }));
}

#[tokio::test]
async fn unmapped_symbols_resolve_through_search() {
    let server = MockServer::start_async().await;
    let search = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/search")
                .query_param("query", "wren");
            then.status(200).json_body(json!({
                "coins": [
                    { "id": "wrong-bird", "symbol": "WRENX" },
                    { "id": "wren-token", "symbol": "WREN" },
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/coins/wren-token/tickers");
            then.status(200).json_body(json!({
                "tickers": [ticker("OnlyVenue", 0.042, 10_000.0, false)]
            }));
        })
        .await;

    let c = connector(&server);
    assert_eq!(c.ticker_price(&token("wren")).await.unwrap(), 0.042);
    assert_eq!(search.hits_async().await, 1);
}

#[tokio::test]
async fn symbol_unknown_to_search_is_no_data() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/search");
            then.status(200).json_body(json!({ "coins": [] }));
        })
        .await;

    let c = connector(&server);
    let err = c.ticker_price(&token("ghost")).await.unwrap_err();
    assert!(matches!(err, PrezzoError::NoData { .. }));
}
