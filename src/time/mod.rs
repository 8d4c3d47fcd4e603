//! Temporal subsystem: text parsing, epoch conversion, fixed-layout
//! timestamps, and cron matching.
//!
//! Everything here is a pure function of its arguments plus, where noted, the
//! host clock or time-zone rules, so it is safe to call from any thread.

pub mod calendar;
pub mod clock;
pub mod cron;
pub mod format;
pub mod parse;

pub use calendar::{
    Breakdown, Epoch, EpochWidth, build, day, hour, local_fields, minute, month, second,
    to_epoch_utc, to_timestamp, utc_fields, weekday, year,
};
pub use cron::{CronExpr, matches};
pub use format::{format, format_bounded, to_gmt_string, to_local_string, uptime};
pub use parse::{CalendarTime, Dst, parse_date_time};
