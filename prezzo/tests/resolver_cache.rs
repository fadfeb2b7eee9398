use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use prezzo::{CacheConfig, DateInput, Prezzo, PrezzoError, PriceQuery, Target};
use prezzo_mock::{FixedClock, MockConnector, Scripted};

fn now_ms() -> i64 {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap()
        .timestamp_millis()
}

fn query(target: Target) -> PriceQuery {
    PriceQuery::new(
        "xmr",
        DateInput::EpochMs(now_ms() - 86_400_000),
        "UTC",
        target,
    )
    .unwrap()
}

fn build(mock: MockConnector) -> Prezzo {
    Prezzo::builder()
        .with_connector(Arc::new(mock))
        .clock(Arc::new(FixedClock(now_ms())))
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn second_resolution_is_served_from_cache() {
    let mock = MockConnector::named("primary").with_candles(Scripted::Price(191.20));
    let calls = mock.call_counter();
    let prezzo = build(mock);

    assert_eq!(prezzo.resolve(&query(Target::High)).await.unwrap(), 191.20);
    assert_eq!(prezzo.resolve(&query(Target::High)).await.unwrap(), 191.20);
    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "cache hit must not reach the provider"
    );
}

#[tokio::test(start_paused = true)]
async fn confirmed_absence_is_negative_cached() {
    let mock = MockConnector::named("primary").with_candles(Scripted::NoData);
    let calls = mock.call_counter();
    let prezzo = build(mock);

    for _ in 0..2 {
        let err = prezzo.resolve(&query(Target::High)).await.unwrap_err();
        assert!(matches!(err, PrezzoError::NoData { .. }));
    }
    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "the second absence must come from the negative cache"
    );
}

#[tokio::test(start_paused = true)]
async fn high_and_low_occupy_distinct_entries() {
    let candle = prezzo::Candle {
        open_time_ms: now_ms() - 86_400_000,
        open: 189.40,
        high: 191.20,
        low: 189.00,
        close: 190.10,
        volume: 12.5,
    };
    let mock = MockConnector::named("primary").with_candles(Scripted::Window(vec![candle]));
    let calls = mock.call_counter();
    let prezzo = build(mock);

    assert_eq!(prezzo.resolve(&query(Target::High)).await.unwrap(), 191.20);
    assert_eq!(prezzo.resolve(&query(Target::Low)).await.unwrap(), 189.00);
    assert_eq!(calls.load(Ordering::SeqCst), 2, "targets must not collide");
}

#[tokio::test]
async fn expired_negative_entries_are_retried() {
    let mock = MockConnector::named("primary").with_candles(Scripted::NoData);
    let calls = mock.call_counter();
    let prezzo = Prezzo::builder()
        .with_connector(Arc::new(mock))
        .clock(Arc::new(FixedClock(now_ms())))
        .cache(CacheConfig {
            positive_ttl: Duration::from_secs(3_600),
            negative_ttl: Duration::from_millis(150),
            max_entries: 16,
        })
        .pacing(prezzo::PacingConfig {
            min_interval: Duration::from_millis(1),
        })
        .build()
        .unwrap();

    let q = query(Target::High);
    assert!(prezzo.resolve(&q).await.is_err());
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(prezzo.resolve(&q).await.is_err());
    assert_eq!(
        calls.load(Ordering::SeqCst),
        2,
        "an expired absence must reach the provider again"
    );
}
