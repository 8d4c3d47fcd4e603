//! Loose date/time text parser.
//!
//! Input is scanned once, left to right. At every position a small
//! deterministic automaton runs as far as the bytes allow and the longest
//! accepted prefix becomes the token; when no token is accepted a single byte
//! is skipped. Recognized tokens:
//!
//! | Token | Example | Kind |
//! |---|---|---|
//! | `YYYY-MM-DD` | `2024-03-15` | date |
//! | `DD/MM/YYYY` | `15/03/2024` | date |
//! | `YYYYMMDD` | `20240315` | date |
//! | `HH:MM[:SS[.f]]` | `14:30:00` | time |
//! | `HHMMSS[.f]` | `143000` | time |
//! | `±HH[[:]MM]` | `+02:00` | UTC offset, only after a time |
//!
//! Later tokens of the same kind overwrite earlier ones.
//!
//! Both `.` and `,` introduce fractional seconds after a time, so a comma
//! glued to a time is not a separator: `12:00:00,2024-03-15` reads the digits
//! after the comma as a fraction and loses the date. Put a space after the
//! comma when a date follows a time.

#![allow(missing_docs)]

use serde::Serialize;

use crate::core::errors::{HwError, Result};

/// Daylight-saving state attached to a calendar reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dst {
    #[default]
    Unknown,
    Yes,
    No,
}

/// A human calendar reading, optionally pinned to a UTC offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CalendarTime {
    pub year: i32,
    /// 1-12 once a date has been seen, 0 otherwise.
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// 0-61; 60 and 61 only appear in leap-second notation.
    pub second: u32,
    /// Seconds east of UTC.
    pub utc_offset: Option<i32>,
    pub dst: Dst,
}

impl CalendarTime {
    /// Calendar reading with the given date and time and no offset.
    #[must_use]
    pub const fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            utc_offset: None,
            dst: Dst::Unknown,
        }
    }

    #[must_use]
    pub const fn with_offset(mut self, seconds: i32) -> Self {
        self.utc_offset = Some(seconds);
        self
    }
}

// ──────────────────── automaton ────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Digit,
    Colon,
    Hyphen,
    Slash,
    Plus,
    Fraction,
    Other,
}

impl Class {
    const fn of(byte: u8) -> Self {
        match byte {
            b'0'..=b'9' => Self::Digit,
            b':' => Self::Colon,
            b'-' => Self::Hyphen,
            b'/' => Self::Slash,
            b'+' => Self::Plus,
            b'.' | b',' => Self::Fraction,
            _ => Self::Other,
        }
    }
}

/// What an accepting state recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    IsoDate,
    DayFirstDate,
    CompactDate,
    ClockTime,
    ClockTimeSeconds,
    CompactTime,
    Offset,
}

/// Automaton states. `D<n>` counts leading digits, `T*` walks `HH:MM:SS`,
/// `Iso*` walks `YYYY-MM-DD`, `Dmy*` walks `DD/MM/YYYY`, `Off*` walks `±HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D6Dot,
    D6Frac,
    D7,
    D8,
    TColon,
    TMin1,
    TMin2,
    TColon2,
    TSec1,
    TSec2,
    TSecDot,
    TSecFrac,
    IsoHyphen,
    IsoMonth1,
    IsoMonth2,
    IsoHyphen2,
    IsoDay1,
    IsoDay2,
    DmySlash,
    DmyMonth1,
    DmyMonth2,
    DmySlash2,
    DmyYear1,
    DmyYear2,
    DmyYear3,
    DmyYear4,
    OffSign,
    OffHour1,
    OffHour2,
    OffColon,
    OffMin1,
    OffMin2,
}

impl State {
    const fn step(self, class: Class) -> Option<Self> {
        use Class::{Colon, Digit, Fraction, Hyphen, Plus, Slash};
        let next = match (self, class) {
            (Self::Start, Digit) => Self::D1,
            (Self::Start, Plus | Hyphen) => Self::OffSign,

            (Self::D1, Digit) => Self::D2,
            (Self::D2, Digit) => Self::D3,
            (Self::D2, Colon) => Self::TColon,
            (Self::D2, Slash) => Self::DmySlash,
            (Self::D3, Digit) => Self::D4,
            (Self::D4, Digit) => Self::D5,
            (Self::D4, Hyphen) => Self::IsoHyphen,
            (Self::D5, Digit) => Self::D6,
            (Self::D6, Digit) => Self::D7,
            (Self::D6, Fraction) => Self::D6Dot,
            (Self::D6Dot | Self::D6Frac, Digit) => Self::D6Frac,
            (Self::D7, Digit) => Self::D8,

            (Self::TColon, Digit) => Self::TMin1,
            (Self::TMin1, Digit) => Self::TMin2,
            (Self::TMin2, Colon) => Self::TColon2,
            (Self::TColon2, Digit) => Self::TSec1,
            (Self::TSec1, Digit) => Self::TSec2,
            (Self::TSec2, Fraction) => Self::TSecDot,
            (Self::TSecDot | Self::TSecFrac, Digit) => Self::TSecFrac,

            (Self::IsoHyphen, Digit) => Self::IsoMonth1,
            (Self::IsoMonth1, Digit) => Self::IsoMonth2,
            (Self::IsoMonth2, Hyphen) => Self::IsoHyphen2,
            (Self::IsoHyphen2, Digit) => Self::IsoDay1,
            (Self::IsoDay1, Digit) => Self::IsoDay2,

            (Self::DmySlash, Digit) => Self::DmyMonth1,
            (Self::DmyMonth1, Digit) => Self::DmyMonth2,
            (Self::DmyMonth2, Slash) => Self::DmySlash2,
            (Self::DmySlash2, Digit) => Self::DmyYear1,
            (Self::DmyYear1, Digit) => Self::DmyYear2,
            (Self::DmyYear2, Digit) => Self::DmyYear3,
            (Self::DmyYear3, Digit) => Self::DmyYear4,

            (Self::OffSign, Digit) => Self::OffHour1,
            (Self::OffHour1, Digit) => Self::OffHour2,
            (Self::OffHour2, Colon) => Self::OffColon,
            (Self::OffHour2 | Self::OffColon, Digit) => Self::OffMin1,
            (Self::OffMin1, Digit) => Self::OffMin2,

            _ => return None,
        };
        Some(next)
    }

    const fn accepts(self) -> Option<Token> {
        match self {
            Self::D6 | Self::D6Frac => Some(Token::CompactTime),
            Self::D8 => Some(Token::CompactDate),
            Self::TMin2 => Some(Token::ClockTime),
            Self::TSec2 | Self::TSecFrac => Some(Token::ClockTimeSeconds),
            Self::IsoDay2 => Some(Token::IsoDate),
            Self::DmyYear4 => Some(Token::DayFirstDate),
            Self::OffHour2 | Self::OffMin2 => Some(Token::Offset),
            _ => None,
        }
    }
}

/// Longest token starting at `bytes[0]`, with its length.
fn longest_token(bytes: &[u8]) -> Option<(Token, usize)> {
    let mut state = State::Start;
    let mut accepted = None;
    for (index, &byte) in bytes.iter().enumerate() {
        let Some(next) = state.step(Class::of(byte)) else {
            break;
        };
        state = next;
        if let Some(token) = state.accepts() {
            accepted = Some((token, index + 1));
        }
    }
    accepted
}

/// Decimal value of an all-digit slice. The automaton only hands over digits.
fn digits(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0, |acc, &byte| acc * 10 + u32::from(byte - b'0'))
}

/// `±HH`, `±HHMM` or `±HH:MM` as signed seconds east of UTC.
fn offset_seconds(token: &[u8]) -> i32 {
    let hours = digits(&token[1..3]);
    let minutes = match token.len() {
        5 => digits(&token[3..5]),
        6 => digits(&token[4..6]),
        _ => 0,
    };
    // At most 99 * 3600 + 99 * 60, well inside i32.
    let magnitude = i32::try_from(hours * 3600 + minutes * 60).unwrap_or(i32::MAX);
    if token[0] == b'-' { -magnitude } else { magnitude }
}

// ──────────────────── parser ────────────────────

/// Parse loosely structured date/time text into calendar fields.
///
/// Fails when the whole input yields neither a date nor a time token.
pub fn parse_date_time(text: &str) -> Result<CalendarTime> {
    let bytes = text.as_bytes();
    let mut fields = CalendarTime::default();
    let mut have_date = false;
    let mut have_time = false;
    let mut cursor = 0;

    while cursor < bytes.len() {
        let rest = &bytes[cursor..];
        let Some((token, len)) = longest_token(rest) else {
            cursor += 1;
            continue;
        };
        let lexeme = &rest[..len];
        match token {
            Token::IsoDate => {
                fields.year = year_of(&lexeme[0..4]);
                fields.month = digits(&lexeme[5..7]);
                fields.day = digits(&lexeme[8..10]);
                have_date = true;
            }
            Token::DayFirstDate => {
                fields.day = digits(&lexeme[0..2]);
                fields.month = digits(&lexeme[3..5]);
                fields.year = year_of(&lexeme[6..10]);
                have_date = true;
            }
            Token::CompactDate => {
                fields.year = year_of(&lexeme[0..4]);
                fields.month = digits(&lexeme[4..6]);
                fields.day = digits(&lexeme[6..8]);
                have_date = true;
            }
            Token::ClockTime => {
                fields.hour = digits(&lexeme[0..2]);
                fields.minute = digits(&lexeme[3..5]);
                fields.second = 0;
                have_time = true;
            }
            Token::ClockTimeSeconds => {
                fields.hour = digits(&lexeme[0..2]);
                fields.minute = digits(&lexeme[3..5]);
                fields.second = digits(&lexeme[6..8]);
                have_time = true;
            }
            Token::CompactTime => {
                fields.hour = digits(&lexeme[0..2]);
                fields.minute = digits(&lexeme[2..4]);
                fields.second = digits(&lexeme[4..6]);
                have_time = true;
            }
            Token::Offset => {
                if have_time {
                    fields.utc_offset = Some(offset_seconds(lexeme));
                }
            }
        }
        cursor += len;
    }

    if have_date || have_time {
        Ok(fields)
    } else {
        Err(HwError::DateParse {
            input: text.to_string(),
            reason: "no date or time token",
        })
    }
}

fn year_of(bytes: &[u8]) -> i32 {
    // Four digits never exceed 9999.
    i32::try_from(digits(bytes)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{CalendarTime, parse_date_time};
    use crate::core::errors::HwError;

    fn date_of(fields: &CalendarTime) -> (i32, u32, u32) {
        (fields.year, fields.month, fields.day)
    }

    fn time_of(fields: &CalendarTime) -> (u32, u32, u32) {
        (fields.hour, fields.minute, fields.second)
    }

    #[test]
    fn all_date_layouts_agree() {
        for text in ["2024-03-15", "20240315", "15/03/2024"] {
            let fields = parse_date_time(text).expect("date should parse");
            assert_eq!(date_of(&fields), (2024, 3, 15), "layout {text}");
            assert_eq!(time_of(&fields), (0, 0, 0), "layout {text}");
        }
    }

    #[test]
    fn both_time_layouts_agree() {
        for text in ["14:30:00", "143000"] {
            let fields = parse_date_time(text).expect("time should parse");
            assert_eq!(time_of(&fields), (14, 30, 0), "layout {text}");
            assert_eq!(fields.year, 0);
        }
    }

    #[test]
    fn short_clock_time_zeroes_seconds() {
        let fields = parse_date_time("143059 09:15").expect("time should parse");
        assert_eq!(time_of(&fields), (9, 15, 0));
    }

    #[test]
    fn offsets_apply_after_time() {
        let plus = parse_date_time("2024-03-15 14:30:00 +02:00").expect("parse");
        assert_eq!(plus.utc_offset, Some(7_200));

        let minus = parse_date_time("2024-03-15 14:30:00 -0530").expect("parse");
        assert_eq!(minus.utc_offset, Some(-19_800));

        let hours_only = parse_date_time("14:30-03").expect("parse");
        assert_eq!(hours_only.utc_offset, Some(-10_800));
    }

    #[test]
    fn offset_before_any_time_is_ignored() {
        let fields = parse_date_time("+02:00 2024-03-15 14:30").expect("parse");
        assert_eq!(fields.utc_offset, None);
        assert_eq!(date_of(&fields), (2024, 3, 15));
        assert_eq!(time_of(&fields), (14, 30, 0));
    }

    #[test]
    fn iso_timestamp_with_t_separator() {
        let fields = parse_date_time("2013-12-14T09:38:08Z").expect("parse");
        assert_eq!(date_of(&fields), (2013, 12, 14));
        assert_eq!(time_of(&fields), (9, 38, 8));
        assert_eq!(fields.utc_offset, None);
    }

    #[test]
    fn fractional_seconds_are_consumed() {
        let fields = parse_date_time("10:20:30.123456+01").expect("parse");
        assert_eq!(time_of(&fields), (10, 20, 30));
        assert_eq!(fields.utc_offset, Some(3_600));

        let compact = parse_date_time("102030,5").expect("parse");
        assert_eq!(time_of(&compact), (10, 20, 30));
    }

    #[test]
    fn last_token_of_a_kind_wins() {
        let fields = parse_date_time("2020-01-01 2024-03-15 01:00 23:59:58").expect("parse");
        assert_eq!(date_of(&fields), (2024, 3, 15));
        assert_eq!(time_of(&fields), (23, 59, 58));
    }

    #[test]
    fn seven_digit_run_reads_as_time_then_rescans() {
        let fields = parse_date_time("1430001").expect("parse");
        assert_eq!(time_of(&fields), (14, 30, 0));
        assert_eq!(fields.year, 0);
    }

    #[test]
    fn hyphen_and_slash_force_dates() {
        let fields = parse_date_time("01/02/1999").expect("parse");
        assert_eq!(date_of(&fields), (1999, 2, 1));
        assert_eq!(time_of(&fields), (0, 0, 0));
    }

    #[test]
    fn fields_are_not_range_checked() {
        let fields = parse_date_time("2024-13-45 99:99").expect("parse");
        assert_eq!(date_of(&fields), (2024, 13, 45));
        assert_eq!((fields.hour, fields.minute), (99, 99));
    }

    #[test]
    fn noise_embedded_around_tokens() {
        let fields = parse_date_time("Date: Fri, 15/03/2024 at 07:05:09 -01").expect("parse");
        assert_eq!(date_of(&fields), (2024, 3, 15));
        assert_eq!(time_of(&fields), (7, 5, 9));
        assert_eq!(fields.utc_offset, Some(-3_600));
    }

    #[test]
    fn noise_only_input_fails() {
        for text in ["hello", "", "12", "+02:00", "2024-3-15", "1/2/2024"] {
            let err = parse_date_time(text).expect_err("should not parse");
            assert!(
                matches!(err, HwError::DateParse { .. }),
                "unexpected error for {text:?}: {err}"
            );
        }
    }

    #[test]
    fn comma_after_time_starts_a_fraction() {
        let fields = parse_date_time("12:00:00,2024-03-15").expect("parse");
        assert_eq!(time_of(&fields), (12, 0, 0));
        assert_eq!(fields.year, 0);
        assert_eq!(fields.utc_offset, Some(-54_000));

        let spaced = parse_date_time("12:00:00, 2024-03-15").expect("parse");
        assert_eq!(date_of(&spaced), (2024, 3, 15));
        assert_eq!(time_of(&spaced), (12, 0, 0));
    }

    #[test]
    fn non_ascii_bytes_are_skipped() {
        let fields = parse_date_time("été 2024-03-15 — 08:00").expect("parse");
        assert_eq!(date_of(&fields), (2024, 3, 15));
        assert_eq!(time_of(&fields), (8, 0, 0));
    }
}
