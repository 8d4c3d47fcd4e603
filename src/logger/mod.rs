//! Structured logging setup on top of `tracing`.
//!
//! Verbosity is passed in explicitly; library code only emits events and the
//! subscriber installed here decides what is shown.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt as subscriber_fmt};

use crate::core::errors::{HwError, Result};

/// Minimum severity that reaches the log sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Raise the level by `steps` notches (one per `-v`), saturating at trace.
    #[must_use]
    pub const fn raised(self, steps: u8) -> Self {
        let mut level = self;
        let mut remaining = steps;
        while remaining > 0 {
            level = match level {
                Self::Error => Self::Warn,
                Self::Warn => Self::Info,
                Self::Info => Self::Debug,
                Self::Debug | Self::Trace => Self::Trace,
            };
            remaining -= 1;
        }
        level
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the global subscriber, writing compact lines to stderr.
///
/// `RUST_LOG` overrides `level` when set.
pub fn init(level: LogLevel) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    subscriber_fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| HwError::Runtime {
            details: format!("logging already initialized: {err}"),
        })
}
