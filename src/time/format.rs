//! Fixed-layout timestamps, pattern formatting, and uptime strings.
//!
//! The 25-byte local stamp and 29-byte GMT stamp are a wire/log contract:
//! consumers slice them by column, so they are assembled by writing bytes into
//! fixed offsets of a template rather than through general formatting.

use std::fmt::Write as _;

use super::calendar::{Breakdown, Epoch, local_fields, local_instant_of, utc_fields};
use crate::core::errors::{HwError, Result};

/// Width of [`to_local_string`] output.
pub const LOCAL_STAMP_LEN: usize = 25;
/// Width of [`to_gmt_string`] output.
pub const GMT_STAMP_LEN: usize = 29;
/// Byte budget of [`uptime`] output, terminator included.
pub const UPTIME_MAX_LEN: usize = 24;

const DAY_NAMES: &[u8; 21] = b"SunMonTueWedThuFriSat";
const MONTH_NAMES: &[u8; 36] = b"JanFebMarAprMayJunJulAugSepOctNovDec";
const DIGITS: &[u8; 10] = b"0123456789";

//                                     0    5  8   12 14 17 20 23
const LOCAL_TEMPLATE: &[u8; LOCAL_STAMP_LEN] = b"aaa, xx aaa xxxx xx:xx:xx";
const GMT_TEMPLATE: &[u8; GMT_STAMP_LEN] = b"aaa, xx aaa xxxx xx:xx:xx GMT";

fn put_pair(buf: &mut [u8], at: usize, value: u32) {
    buf[at] = DIGITS[(value / 10 % 10) as usize];
    buf[at + 1] = DIGITS[(value % 10) as usize];
}

fn put_name(buf: &mut [u8], at: usize, table: &[u8], index: u32) {
    let start = index as usize * 3;
    buf[at..at + 3].copy_from_slice(&table[start..start + 3]);
}

fn stamp<const N: usize>(template: &[u8; N], fields: &Breakdown) -> Result<String> {
    let year = u32::try_from(fields.year)
        .ok()
        .filter(|year| *year <= 9999)
        .ok_or_else(|| HwError::range("year", fields.year, 0, 9999))?;

    let mut buf = *template;
    put_name(&mut buf, 0, DAY_NAMES, fields.weekday);
    put_pair(&mut buf, 5, fields.day);
    put_name(&mut buf, 8, MONTH_NAMES, fields.month - 1);
    put_pair(&mut buf, 12, year / 100);
    put_pair(&mut buf, 14, year % 100);
    put_pair(&mut buf, 17, fields.hour);
    put_pair(&mut buf, 20, fields.minute);
    put_pair(&mut buf, 23, fields.second);
    Ok(buf.iter().copied().map(char::from).collect())
}

/// `"Www, dd Mmm yyyy hh:mm:ss"` in host-local time, always 25 bytes.
pub fn to_local_string(epoch: Epoch) -> Result<String> {
    stamp(LOCAL_TEMPLATE, &local_fields(epoch)?)
}

/// `"Www, dd Mmm yyyy hh:mm:ss GMT"` in UTC, always 29 bytes.
pub fn to_gmt_string(epoch: Epoch) -> Result<String> {
    stamp(GMT_TEMPLATE, &utc_fields(epoch)?)
}

/// Render `epoch` in local time with a strftime-style `pattern`.
///
/// Never fails: an unsupported pattern or unrepresentable instant yields an
/// empty string.
pub fn format(pattern: &str, epoch: Epoch) -> String {
    let Ok(instant) = local_instant_of(epoch) else {
        return String::new();
    };
    let mut out = String::new();
    if write!(out, "{}", instant.format(pattern)).is_err() {
        return String::new();
    }
    out
}

/// Like [`format`], but also empty when the output and its terminator would
/// not fit in `capacity` bytes.
pub fn format_bounded(pattern: &str, epoch: Epoch, capacity: usize) -> String {
    let out = format(pattern, epoch);
    if out.len() < capacity { out } else { String::new() }
}

/// Human uptime such as `"3d, 4h, 12m"`.
///
/// Days and hours appear only when non-zero, minutes always; leftover seconds
/// are dropped. Zero renders as an empty string.
pub fn uptime(seconds: u64) -> String {
    if seconds == 0 {
        return String::new();
    }
    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3_600;
    let minutes = seconds % 3_600 / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    parts.push(format!("{minutes}m"));

    let mut text = parts.join(", ");
    text.truncate(UPTIME_MAX_LEN - 1);
    text
}
