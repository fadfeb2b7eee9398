use std::sync::Arc;

use chrono::{TimeZone, Utc};

use prezzo::{CalendarStamp, Candle, DateInput, Prezzo, PriceQuery, Target};
use prezzo_mock::{FixedClock, MockConnector, Scripted};

fn now_ms() -> i64 {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap()
        .timestamp_millis()
}

// One fine-grained candle sitting right at the normalized instant:
// 2025-12-09 22:46:02 CST is 2025-12-10 04:46:02 UTC.
fn xmr_candle() -> Candle {
    let open_time_ms = Utc
        .with_ymd_and_hms(2025, 12, 10, 4, 46, 0)
        .single()
        .unwrap()
        .timestamp_millis();
    Candle {
        open_time_ms,
        open: 189.40,
        high: 191.20,
        low: 189.00,
        close: 190.10,
        volume: 12.5,
    }
}

fn query(target: Target) -> PriceQuery {
    PriceQuery::new(
        "xmr",
        DateInput::Components(CalendarStamp::parse("2025-12-09 22:46:02").unwrap()),
        "CST",
        target,
    )
    .unwrap()
}

fn resolver(mock: MockConnector) -> Prezzo {
    Prezzo::builder()
        .with_connector(Arc::new(mock))
        .clock(Arc::new(FixedClock(now_ms())))
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn high_target_picks_the_candle_high() {
    let mock = MockConnector::named("primary").with_candles(Scripted::Window(vec![xmr_candle()]));
    let prezzo = resolver(mock);

    let price = prezzo.resolve(&query(Target::High)).await.unwrap();
    assert_eq!(price, 191.20);
}

#[tokio::test(start_paused = true)]
async fn low_target_is_independent_of_the_high_path() {
    let mock = MockConnector::named("primary").with_candles(Scripted::Window(vec![xmr_candle()]));
    let prezzo = resolver(mock);

    let price = prezzo.resolve(&query(Target::Low)).await.unwrap();
    assert_eq!(price, 189.00);
}

#[tokio::test(start_paused = true)]
async fn both_targets_resolve_from_the_same_candle() {
    let mock = MockConnector::named("primary").with_candles(Scripted::Window(vec![xmr_candle()]));
    let counter = mock.call_counter();
    let prezzo = resolver(mock);

    assert_eq!(prezzo.resolve(&query(Target::High)).await.unwrap(), 191.20);
    assert_eq!(prezzo.resolve(&query(Target::Low)).await.unwrap(), 189.00);
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 2);
}
