use chrono::{Datelike, TimeZone, Timelike, Utc};
use proptest::prelude::*;

use prezzo_core::{
    CalendarStamp, DateInput, InputErrorKind, PrezzoError, UtcInstant, ensure_not_future,
    normalize, zone_offset_secs,
};

const LABELS: &[&str] = &[
    "UTC", "GMT", "EST", "EDT", "CST", "CDT", "MST", "MDT", "PST", "PDT", "CET", "CEST", "JST",
    "AEST", "IST",
];

proptest! {
    // Round-trip law: offsetting the normalized UTC instant back by the same
    // zone recovers the original local components.
    #[test]
    fn normalize_round_trips_local_components(
        year in 1970i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
        second in 0u32..60,
        label_idx in 0usize..LABELS.len(),
    ) {
        let label = LABELS[label_idx];
        let stamp = CalendarStamp { year, month, day, hour, minute, second };

        let instant = normalize(&DateInput::Components(stamp), label).unwrap();
        let offset_ms = i64::from(zone_offset_secs(label)) * 1_000;
        let local = Utc
            .timestamp_millis_opt(instant.as_millis() + offset_ms)
            .single()
            .unwrap();

        prop_assert_eq!(local.year(), stamp.year);
        prop_assert_eq!(local.month(), stamp.month);
        prop_assert_eq!(local.day(), stamp.day);
        prop_assert_eq!(local.hour(), stamp.hour);
        prop_assert_eq!(local.minute(), stamp.minute);
        prop_assert_eq!(local.second(), stamp.second);
    }

    #[test]
    fn normalize_is_deterministic(
        year in 1970i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        label_idx in 0usize..LABELS.len(),
    ) {
        let stamp = CalendarStamp { year, month, day, hour: 12, minute: 0, second: 0 };
        let input = DateInput::Components(stamp);
        let a = normalize(&input, LABELS[label_idx]).unwrap();
        let b = normalize(&input, LABELS[label_idx]).unwrap();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn calendar_invalid_dates_are_rejected_not_adjusted() {
    for (bad, label) in [
        ("2025-02-30 00:00:00", "UTC"),
        ("2025-04-31 10:00:00", "CET"),
        ("2023-02-29 00:00:00", "UTC"),
        ("2025-13-01 00:00:00", "UTC"),
        ("2025-06-15 24:00:00", "UTC"),
        ("2025-06-15 10:61:00", "UTC"),
    ] {
        let stamp = CalendarStamp::parse(bad).unwrap();
        let err = normalize(&DateInput::Components(stamp), label).unwrap_err();
        assert!(
            matches!(
                err,
                PrezzoError::InvalidInput {
                    kind: InputErrorKind::Calendar,
                    ..
                }
            ),
            "{bad} produced {err:?}"
        );
    }
}

#[test]
fn leap_day_on_a_leap_year_is_legal() {
    let stamp = CalendarStamp::parse("2024-02-29 23:59:59").unwrap();
    assert!(normalize(&DateInput::Components(stamp), "UTC").is_ok());
}

#[test]
fn epoch_input_passes_through_untouched() {
    let instant = normalize(&DateInput::EpochMs(1_700_000_000_123), "PST").unwrap();
    assert_eq!(instant, UtcInstant(1_700_000_000_123));
}

#[test]
fn cst_components_shift_six_hours_toward_utc() {
    // 2025-12-09 22:46:02 CST is 2025-12-10 04:46:02 UTC.
    let stamp = CalendarStamp::parse("2025-12-09 22:46:02").unwrap();
    let instant = normalize(&DateInput::Components(stamp), "CST").unwrap();
    let expected = Utc
        .with_ymd_and_hms(2025, 12, 10, 4, 46, 2)
        .single()
        .unwrap()
        .timestamp_millis();
    assert_eq!(instant.as_millis(), expected);
}

#[test]
fn future_instants_are_a_distinct_condition() {
    let now_ms = 1_700_000_000_000;
    let err = ensure_not_future(UtcInstant(now_ms + 1), now_ms).unwrap_err();
    assert!(matches!(err, PrezzoError::FutureInstant { .. }));

    assert!(ensure_not_future(UtcInstant(now_ms), now_ms).is_ok());
    assert!(ensure_not_future(UtcInstant(now_ms - 1), now_ms).is_ok());
}
