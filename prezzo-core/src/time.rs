//! Calendar parsing and fixed-offset timezone normalization.
//!
//! The zone table maps abbreviations to fixed UTC offsets; no DST rules are
//! applied. The caller must supply the abbreviation that was in force at the
//! queried instant (CST vs CDT, CET vs CEST, ...).

use std::fmt;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::error::PrezzoError;
use crate::types::UtcInstant;

/// Structured calendar components in some local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarStamp {
    /// Four-digit year.
    pub year: i32,
    /// Month, 1-12.
    pub month: u32,
    /// Day of month, 1-31.
    pub day: u32,
    /// Hour, 0-23.
    pub hour: u32,
    /// Minute, 0-59.
    pub minute: u32,
    /// Second, 0-59.
    pub second: u32,
}

impl CalendarStamp {
    /// Parse the fixed `YYYY-MM-DD HH:MM:SS` shape.
    ///
    /// This checks the textual shape only; field legality (month ranges,
    /// leap days) is the job of [`normalize`], which reports it as a
    /// distinct calendar error.
    ///
    /// # Errors
    /// Returns a format-stage `InvalidInput` for any shape deviation.
    pub fn parse(input: &str) -> Result<Self, PrezzoError> {
        let bytes = input.as_bytes();
        let shape_ok = bytes.len() == 19
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes[10] == b' '
            && bytes[13] == b':'
            && bytes[16] == b':';
        if !shape_ok {
            return Err(PrezzoError::format(format!(
                "expected \"YYYY-MM-DD HH:MM:SS\", got {input:?}"
            )));
        }

        let field = |range: std::ops::Range<usize>| -> Result<u32, PrezzoError> {
            let s = &input[range];
            if !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(PrezzoError::format(format!(
                    "non-digit field {s:?} in {input:?}"
                )));
            }
            s.parse::<u32>()
                .map_err(|_| PrezzoError::format(format!("unparseable field {s:?} in {input:?}")))
        };

        Ok(Self {
            year: i32::try_from(field(0..4)?)
                .map_err(|_| PrezzoError::format(format!("year out of range in {input:?}")))?,
            month: field(5..7)?,
            day: field(8..10)?,
            hour: field(11..13)?,
            minute: field(14..16)?,
            second: field(17..19)?,
        })
    }
}

impl fmt::Display for CalendarStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// A date representation the resolver accepts. Free-form text is not one.
#[derive(Debug, Clone, Copy)]
pub enum DateInput {
    /// Structured local calendar components, interpreted in the query's zone.
    Components(CalendarStamp),
    /// An already-absolute UTC timestamp; passes through normalization.
    EpochMs(i64),
}

/// Fixed abbreviation → UTC offset, in seconds.
const ZONE_OFFSETS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("EST", -5 * 3_600),
    ("EDT", -4 * 3_600),
    ("CST", -6 * 3_600),
    ("CDT", -5 * 3_600),
    ("MST", -7 * 3_600),
    ("MDT", -6 * 3_600),
    ("PST", -8 * 3_600),
    ("PDT", -7 * 3_600),
    ("AKST", -9 * 3_600),
    ("HST", -10 * 3_600),
    ("BST", 3_600),
    ("CET", 3_600),
    ("CEST", 2 * 3_600),
    ("EET", 2 * 3_600),
    ("EEST", 3 * 3_600),
    ("MSK", 3 * 3_600),
    ("IST", 5 * 3_600 + 1_800),
    ("SGT", 8 * 3_600),
    ("HKT", 8 * 3_600),
    ("JST", 9 * 3_600),
    ("KST", 9 * 3_600),
    ("AEST", 10 * 3_600),
    ("AEDT", 11 * 3_600),
    ("NZST", 12 * 3_600),
    ("NZDT", 13 * 3_600),
];

/// Look up a zone abbreviation's fixed offset in seconds.
///
/// Unknown labels resolve to offset 0 (UTC), keeping the lookup total.
#[must_use]
pub fn zone_offset_secs(label: &str) -> i32 {
    let wanted = label.trim().to_ascii_uppercase();
    ZONE_OFFSETS
        .iter()
        .find(|(abbr, _)| *abbr == wanted)
        .map_or(0, |(_, secs)| *secs)
}

/// Normalize a date input plus zone label into an absolute UTC instant.
///
/// # Errors
/// Returns a calendar-stage `InvalidInput` when the components name no real
/// instant (Feb 30, hour 25, ...); components are never silently adjusted.
pub fn normalize(date: &DateInput, tz_label: &str) -> Result<UtcInstant, PrezzoError> {
    match *date {
        DateInput::EpochMs(ms) => Ok(UtcInstant(ms)),
        DateInput::Components(stamp) => {
            let date = NaiveDate::from_ymd_opt(stamp.year, stamp.month, stamp.day)
                .ok_or_else(|| PrezzoError::calendar(format!("no such calendar date: {stamp}")))?;
            let time = date
                .and_hms_opt(stamp.hour, stamp.minute, stamp.second)
                .ok_or_else(|| PrezzoError::calendar(format!("no such time of day: {stamp}")))?;
            let local_as_utc_ms = Utc.from_utc_datetime(&time).timestamp_millis();
            let offset_ms = i64::from(zone_offset_secs(tz_label)) * 1_000;
            Ok(UtcInstant(local_as_utc_ms - offset_ms))
        }
    }
}

/// Reject instants strictly after `now_ms`.
///
/// # Errors
/// Returns `FutureInstant`, which is distinct from `InvalidInput` so callers
/// and tests can tell the two apart.
pub fn ensure_not_future(instant: UtcInstant, now_ms: i64) -> Result<(), PrezzoError> {
    if instant.as_millis() > now_ms {
        return Err(PrezzoError::FutureInstant {
            instant_ms: instant.as_millis(),
        });
    }
    Ok(())
}

/// Wall-clock source; injectable so tests can pin "now".
pub trait Clock: Send + Sync {
    /// Current instant in epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_shape_deviations() {
        for bad in [
            "2025-12-09",
            "2025/12/09 22:46:02",
            "2025-12-09T22:46:02",
            "2025-12-09 22:46",
            "25-12-09 22:46:02",
            "2025-12-09 22:46:02 ",
        ] {
            assert!(
                matches!(
                    CalendarStamp::parse(bad),
                    Err(PrezzoError::InvalidInput {
                        kind: crate::error::InputErrorKind::Format,
                        ..
                    })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn parse_accepts_the_exact_shape() {
        let stamp = CalendarStamp::parse("2025-12-09 22:46:02").unwrap();
        assert_eq!(stamp.year, 2025);
        assert_eq!(stamp.month, 12);
        assert_eq!(stamp.second, 2);
        assert_eq!(stamp.to_string(), "2025-12-09 22:46:02");
    }

    #[test]
    fn unknown_zone_falls_back_to_utc() {
        assert_eq!(zone_offset_secs("XYZ"), 0);
        assert_eq!(zone_offset_secs(" cst "), -6 * 3_600);
    }
}
