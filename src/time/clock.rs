//! Host wall-clock reads.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::calendar::Epoch;
use crate::core::errors::{HwError, Result};

fn since_epoch() -> Result<Duration> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| HwError::Clock {
            details: format!("system time is {:?} before the Unix epoch", err.duration()),
        })
}

fn to_i64(value: u128) -> Result<i64> {
    i64::try_from(value).map_err(|_| HwError::Clock {
        details: format!("clock reading {value} does not fit in 64 bits"),
    })
}

/// Current time in whole seconds.
pub fn now() -> Result<Epoch> {
    to_i64(u128::from(since_epoch()?.as_secs()))
}

/// Current time in milliseconds.
pub fn milli() -> Result<i64> {
    to_i64(since_epoch()?.as_millis())
}

/// Current time in microseconds.
pub fn micro() -> Result<i64> {
    to_i64(since_epoch()?.as_micros())
}

/// Block the calling thread for `micros` microseconds.
pub fn usleep(micros: u64) {
    std::thread::sleep(Duration::from_micros(micros));
}
