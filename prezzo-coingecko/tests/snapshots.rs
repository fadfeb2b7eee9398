use httpmock::prelude::*;
use serde_json::json;

use prezzo_coingecko::CoinGeckoConnector;
use prezzo_core::{PrezzoError, SnapshotProvider, Target, TokenSymbol, UtcInstant};

// 2025-12-10 04:46:02 UTC
const INSTANT_MS: i64 = 1_765_341_962_000;

fn connector(server: &MockServer) -> CoinGeckoConnector {
    CoinGeckoConnector::builder().base_url(server.base_url()).build()
}

fn token(s: &str) -> TokenSymbol {
    TokenSymbol::new(s).unwrap()
}

#[tokio::test]
async fn extremes_come_from_points_inside_the_period() {
    let server = MockServer::start_async().await;
    let chart = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/coins/monero/market_chart/range")
                .query_param("vs_currency", "usd");
            then.status(200).json_body(json!({
                "prices": [
                    [INSTANT_MS - 20 * 3_600 * 1_000, 205.0],  // outside the period
                    [INSTANT_MS - 3 * 3_600 * 1_000, 189.4],
                    [INSTANT_MS - 3_600 * 1_000, 191.1],
                    [INSTANT_MS + 2 * 3_600 * 1_000, 190.2],
                    [INSTANT_MS + 20 * 3_600 * 1_000, 150.0],  // outside the period
                ]
            }));
        })
        .await;

    let c = connector(&server);
    let instant = UtcInstant(INSTANT_MS);

    let high = c.snapshot_extreme(&token("xmr"), instant, Target::High).await.unwrap();
    assert_eq!(high, 191.1);

    let low = c.snapshot_extreme(&token("xmr"), instant, Target::Low).await.unwrap();
    assert_eq!(low, 189.4);

    assert_eq!(chart.hits_async().await, 2);
}

#[tokio::test]
async fn empty_period_falls_back_to_closest_prior_point() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/coins/monero/market_chart/range");
            then.status(200).json_body(json!({
                "prices": [
                    [INSTANT_MS - 23 * 3_600 * 1_000, 186.0],
                    [INSTANT_MS - 18 * 3_600 * 1_000, 187.5],
                    [INSTANT_MS + 18 * 3_600 * 1_000, 195.0],
                ]
            }));
        })
        .await;

    let c = connector(&server);
    let price = c
        .snapshot_extreme(&token("xmr"), UtcInstant(INSTANT_MS), Target::High)
        .await
        .unwrap();
    // closest prior point behaves like a closing price
    assert_eq!(price, 187.5);
}

#[tokio::test]
async fn no_points_at_all_is_no_data() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/coins/monero/market_chart/range");
            then.status(200).json_body(json!({ "prices": [] }));
        })
        .await;

    let c = connector(&server);
    let err = c
        .snapshot_extreme(&token("xmr"), UtcInstant(INSTANT_MS), Target::Low)
        .await
        .unwrap_err();
    assert!(matches!(err, PrezzoError::NoData { .. }));
}

#[tokio::test]
async fn upstream_404_is_no_data_not_a_fault() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/coins/monero/market_chart/range");
            then.status(404).json_body(json!({ "error": "coin not found" }));
        })
        .await;

    let c = connector(&server);
    let err = c
        .snapshot_extreme(&token("xmr"), UtcInstant(INSTANT_MS), Target::High)
        .await
        .unwrap_err();
    assert!(matches!(err, PrezzoError::NoData { .. }));
    assert!(err.continues_fallback());
}
