//! Calendar fields <-> epoch seconds.
//!
//! UTC conversion is closed-form arithmetic and never consults the host.
//! Local conversions (`build` and the field accessors) go through the host
//! time-zone rules and are DST aware.

#![allow(missing_docs)]

use chrono::{
    DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone,
    Timelike, Utc,
};
use serde::Serialize;
use tracing::warn;

use super::parse::{CalendarTime, parse_date_time};
use crate::core::errors::{HwError, Result};

/// Signed seconds since 1970-01-01T00:00:00Z.
pub type Epoch = i64;

/// Width of the epoch representation a conversion must fit into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EpochWidth {
    /// 64-bit seconds; only the calendar arithmetic limits the range.
    #[default]
    Wide,
    /// 32-bit seconds, as on constrained targets; overflow is an error.
    Narrow,
}

/// Days before the first of each month in a common year.
const DAYS_BEFORE_MONTH: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Leap years in `[0, year)`.
fn leap_years_before(year: i64) -> i64 {
    let y = year - 1;
    y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400)
}

/// Gregorian leap-year rule.
#[must_use]
pub const fn is_leap_year(year: i64) -> bool {
    year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
}

/// Interpret `fields` as a UTC wall-clock reading and return its epoch.
///
/// `utc_offset` and `dst` are ignored here; see [`to_timestamp`] for the
/// offset-aware entrypoint. Only the month is validated.
pub fn to_epoch_utc(fields: &CalendarTime, width: EpochWidth) -> Result<Epoch> {
    if !(1..=12).contains(&fields.month) {
        return Err(HwError::range("month", fields.month, 1, 12));
    }
    let year = i64::from(fields.year);
    let month_index = (fields.month - 1) as usize;

    let mut days = (year - 1970) * 365 + leap_years_before(year) - leap_years_before(1970)
        + DAYS_BEFORE_MONTH[month_index]
        + i64::from(fields.day)
        - 1;
    if month_index >= 2 && is_leap_year(year) {
        days += 1;
    }

    let seconds = (days * 24 + i64::from(fields.hour)) * 3600
        + i64::from(fields.minute) * 60
        + i64::from(fields.second);

    if width == EpochWidth::Narrow && i32::try_from(seconds).is_err() {
        return Err(HwError::range(
            "epoch",
            seconds,
            i64::from(i32::MIN),
            i64::from(i32::MAX),
        ));
    }
    Ok(seconds)
}

/// Parse `text` and convert it to an absolute instant.
///
/// The text must carry a date; a trailing UTC offset shifts the result,
/// otherwise the reading is taken as UTC.
pub fn to_timestamp(text: &str) -> Result<Epoch> {
    let fields = parse_date_time(text)?;
    if fields.year == 0 {
        return Err(HwError::DateParse {
            input: text.to_string(),
            reason: "no date present",
        });
    }
    let utc = to_epoch_utc(&fields, EpochWidth::Wide)?;
    Ok(utc - i64::from(fields.utc_offset.unwrap_or(0)))
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(HwError::range(field, value, i64::from(min), i64::from(max)))
    }
}

/// Convert a local wall-clock reading to an instant.
///
/// Every argument is checked against its documented bound first. Days past
/// the end of the month and leap seconds roll forward the way `mktime` does.
/// Ambiguous readings take the earlier instant; readings inside a DST gap are
/// pushed forward by the length of the gap.
pub fn build(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<Epoch> {
    if !(1970..=2037).contains(&year) {
        return Err(HwError::range("year", year, 1970, 2037));
    }
    check_range("month", month, 1, 12)?;
    check_range("day", day, 1, 31)?;
    check_range("hour", hour, 0, 23)?;
    check_range("minute", minute, 0, 59)?;
    check_range("second", second, 0, 61)?;

    let naive = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.checked_add_signed(TimeDelta::days(i64::from(day) - 1)))
        .and_then(|date| {
            date.checked_add_signed(TimeDelta::seconds(
                i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second),
            ))
        })
        .ok_or_else(|| HwError::Runtime {
            details: format!("calendar overflow building {year}-{month:02}-{day:02}"),
        })?;

    local_instant(naive)
}

fn local_instant(naive: NaiveDateTime) -> Result<Epoch> {
    match earlier_reading(Local.from_local_datetime(&naive)) {
        Some(instant) => Ok(instant.timestamp()),
        None => {
            // Inside a spring-forward gap: read the wall clock with the offset in
            // force before the transition.
            let before = naive
                .checked_sub_signed(TimeDelta::days(1))
                .and_then(|earlier| earlier_reading(Local.from_local_datetime(&earlier)))
                .ok_or_else(|| HwError::Runtime {
                    details: format!("no local time zone mapping for {naive}"),
                })?;
            let offset = i64::from(before.offset().local_minus_utc());
            let epoch = naive.and_utc().timestamp() - offset;
            warn!(%naive, epoch, "local time falls in a DST gap; normalized forward");
            Ok(epoch)
        }
    }
}

/// The earlier of the two instants of a fall-back overlap. chrono does not
/// promise an order for `Ambiguous`, so compare instead of taking the first.
fn earlier_reading(result: LocalResult<DateTime<Local>>) -> Option<DateTime<Local>> {
    match result {
        LocalResult::Single(instant) => Some(instant),
        LocalResult::Ambiguous(first, second) => Some(first.min(second)),
        LocalResult::None => None,
    }
}

pub(crate) fn utc_instant(epoch: Epoch) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(epoch, 0).ok_or_else(|| {
        HwError::range(
            "epoch",
            epoch,
            DateTime::<Utc>::MIN_UTC.timestamp(),
            DateTime::<Utc>::MAX_UTC.timestamp(),
        )
    })
}

pub(crate) fn local_instant_of(epoch: Epoch) -> Result<DateTime<Local>> {
    utc_instant(epoch).map(|utc| utc.with_timezone(&Local))
}

/// Calendar breakdown of an instant, in local time or UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub year: i32,
    /// 1-12.
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// 0 = Sunday.
    pub weekday: u32,
}

impl Breakdown {
    fn from_datetime<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
            day: instant.day(),
            hour: instant.hour(),
            minute: instant.minute(),
            second: instant.second(),
            weekday: instant.weekday().num_days_from_sunday(),
        }
    }
}

/// All local calendar fields of `epoch` in one conversion.
pub fn local_fields(epoch: Epoch) -> Result<Breakdown> {
    local_instant_of(epoch).map(|instant| Breakdown::from_datetime(&instant))
}

/// UTC calendar fields of `epoch`.
pub fn utc_fields(epoch: Epoch) -> Result<Breakdown> {
    utc_instant(epoch).map(|instant| Breakdown::from_datetime(&instant))
}

/// Seconds, 0-60.
pub fn second(epoch: Epoch) -> Result<u32> {
    local_fields(epoch).map(|fields| fields.second)
}

pub fn minute(epoch: Epoch) -> Result<u32> {
    local_fields(epoch).map(|fields| fields.minute)
}

pub fn hour(epoch: Epoch) -> Result<u32> {
    local_fields(epoch).map(|fields| fields.hour)
}

/// Day of the week, 0 = Sunday.
pub fn weekday(epoch: Epoch) -> Result<u32> {
    local_fields(epoch).map(|fields| fields.weekday)
}

/// Day of the month, 1-31.
pub fn day(epoch: Epoch) -> Result<u32> {
    local_fields(epoch).map(|fields| fields.day)
}

/// Month, 1-12.
pub fn month(epoch: Epoch) -> Result<u32> {
    local_fields(epoch).map(|fields| fields.month)
}

/// Full four-digit year.
pub fn year(epoch: Epoch) -> Result<i32> {
    local_fields(epoch).map(|fields| fields.year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_utc_instants() {
        let cases = [
            (CalendarTime::new(1970, 1, 1, 0, 0, 0), 0),
            (CalendarTime::new(2000, 1, 1, 0, 0, 0), 946_684_800),
            (CalendarTime::new(2000, 2, 29, 12, 0, 0), 951_825_600),
            (CalendarTime::new(2000, 3, 1, 0, 0, 0), 951_868_800),
            (CalendarTime::new(2038, 1, 19, 3, 14, 7), 2_147_483_647),
            (CalendarTime::new(1969, 12, 31, 23, 59, 59), -1),
            (CalendarTime::new(2100, 3, 1, 0, 0, 0), 4_107_542_400),
        ];
        for (fields, expected) in cases {
            assert_eq!(
                to_epoch_utc(&fields, EpochWidth::Wide).expect("in range"),
                expected,
                "{fields:?}"
            );
        }
    }

    #[test]
    fn utc_conversion_ignores_offset_field() {
        let plain = CalendarTime::new(2024, 3, 15, 14, 30, 0);
        let shifted = plain.with_offset(7_200);
        assert_eq!(
            to_epoch_utc(&plain, EpochWidth::Wide).expect("valid"),
            to_epoch_utc(&shifted, EpochWidth::Wide).expect("valid")
        );
    }

    #[test]
    fn utc_conversion_rejects_bad_month() {
        for month in [0, 13] {
            let err = to_epoch_utc(&CalendarTime::new(2024, month, 1, 0, 0, 0), EpochWidth::Wide)
                .expect_err("month out of range");
            assert!(matches!(err, HwError::Range { field: "month", .. }));
        }
    }

    #[test]
    fn narrow_width_detects_overflow() {
        let last = CalendarTime::new(2038, 1, 19, 3, 14, 7);
        assert_eq!(
            to_epoch_utc(&last, EpochWidth::Narrow).expect("fits"),
            i64::from(i32::MAX)
        );

        let past = CalendarTime::new(2038, 1, 19, 3, 14, 8);
        let err = to_epoch_utc(&past, EpochWidth::Narrow).expect_err("overflow");
        assert!(matches!(err, HwError::Range { field: "epoch", .. }));
        assert!(to_epoch_utc(&past, EpochWidth::Wide).is_ok());
    }

    #[test]
    fn leap_year_rule() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert_eq!(leap_years_before(1970), 477);
        assert_eq!(leap_years_before(2001) - leap_years_before(1970), 8);
    }

    #[test]
    fn timestamp_applies_offset() {
        assert_eq!(to_timestamp("2000-01-01").expect("valid"), 946_684_800);
        assert_eq!(
            to_timestamp("2000-01-01 02:00:00 +02:00").expect("valid"),
            946_684_800
        );
        assert_eq!(
            to_timestamp("19991231T183000-0530").expect("valid"),
            946_684_800
        );
    }

    #[test]
    fn timestamp_requires_a_date() {
        let err = to_timestamp("14:30:00").expect_err("no date");
        assert!(matches!(
            err,
            HwError::DateParse {
                reason: "no date present",
                ..
            }
        ));
        assert!(matches!(
            to_timestamp("hello").expect_err("noise"),
            HwError::DateParse { .. }
        ));
    }

    #[test]
    fn timestamp_rejects_month_zero_from_text() {
        let err = to_timestamp("2024-00-10").expect_err("month 0");
        assert!(matches!(err, HwError::Range { field: "month", .. }));
    }

    #[test]
    fn build_rejects_first_out_of_range_field() {
        let cases = [
            ((1969, 1, 1, 0, 0, 0), "year"),
            ((2038, 1, 1, 0, 0, 0), "year"),
            ((2024, 13, 1, 0, 0, 0), "month"),
            ((2024, 0, 0, 0, 0, 0), "month"),
            ((2024, 1, 32, 0, 0, 0), "day"),
            ((2024, 1, 1, 24, 0, 0), "hour"),
            ((2024, 1, 1, 0, 60, 0), "minute"),
            ((2024, 1, 1, 0, 0, 62), "second"),
        ];
        for ((y, mo, d, h, mi, s), expected) in cases {
            let err = build(y, mo, d, h, mi, s).expect_err("out of range");
            match err {
                HwError::Range { field, .. } => assert_eq!(field, expected),
                other => panic!("unexpected error {other}"),
            }
        }
    }

    #[test]
    fn build_round_trips_through_local_accessors() {
        let epoch = build(2024, 7, 4, 13, 45, 30).expect("valid");
        assert_eq!(year(epoch).expect("year"), 2024);
        assert_eq!(month(epoch).expect("month"), 7);
        assert_eq!(day(epoch).expect("day"), 4);
        assert_eq!(hour(epoch).expect("hour"), 13);
        assert_eq!(minute(epoch).expect("minute"), 45);
        assert_eq!(second(epoch).expect("second"), 30);
        // 2024-07-04 was a Thursday.
        assert_eq!(weekday(epoch).expect("weekday"), 4);
    }

    #[test]
    fn build_rolls_leap_second_into_next_minute() {
        let leap = build(2024, 7, 4, 13, 45, 60).expect("valid");
        let next = build(2024, 7, 4, 13, 46, 0).expect("valid");
        assert_eq!(leap, next);
    }

    #[test]
    fn build_normalizes_day_overflow() {
        let overflow = build(2023, 2, 31, 12, 0, 0).expect("valid");
        let normalized = build(2023, 3, 3, 12, 0, 0).expect("valid");
        assert_eq!(overflow, normalized);
    }

    #[test]
    fn utc_fields_decompose() {
        let fields = utc_fields(951_825_600).expect("valid");
        assert_eq!(
            (fields.year, fields.month, fields.day, fields.hour),
            (2000, 2, 29, 12)
        );
        // 2000-02-29 was a Tuesday.
        assert_eq!(fields.weekday, 2);
    }

    #[test]
    fn accessors_reject_unrepresentable_epochs() {
        assert!(matches!(
            local_fields(i64::MAX).expect_err("too large"),
            HwError::Range { field: "epoch", .. }
        ));
    }
}
