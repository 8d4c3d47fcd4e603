//! hostwatch: the temporal core of a host monitoring daemon.
//!
//! Parses loose date/time text, converts between calendar readings and epoch
//! seconds, renders fixed-layout timestamps, and decides which checks run in
//! a monitoring cycle from their `every` rules and cron expressions.

pub mod core;
pub mod logger;
pub mod monitor;
pub mod time;

#[cfg(feature = "cli")]
pub mod cli_app;

pub use crate::core::errors::{HwError, Result};
