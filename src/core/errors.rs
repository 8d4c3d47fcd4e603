//! HW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, HwError>;

/// Top-level error type for hostwatch.
#[derive(Debug, Error)]
pub enum HwError {
    #[error("[HW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[HW-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[HW-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[HW-2001] invalid date or time: {input:?} ({reason})")]
    DateParse { input: String, reason: &'static str },

    #[error("[HW-2002] {field} {value} is outside the range <{min}..{max}>")]
    Range {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("[HW-2003] invalid cron expression {expression:?}: {details}")]
    InvalidCron { expression: String, details: String },

    #[error("[HW-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[HW-3001] system clock unavailable: {details}")]
    Clock { details: String },

    #[error("[HW-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[HW-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl HwError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "HW-1001",
            Self::MissingConfig { .. } => "HW-1002",
            Self::ConfigParse { .. } => "HW-1003",
            Self::DateParse { .. } => "HW-2001",
            Self::Range { .. } => "HW-2002",
            Self::InvalidCron { .. } => "HW-2003",
            Self::Serialization { .. } => "HW-2101",
            Self::Clock { .. } => "HW-3001",
            Self::Io { .. } => "HW-3002",
            Self::Runtime { .. } => "HW-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Clock { .. } | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Range failure for a named field with inclusive bounds.
    #[must_use]
    pub fn range(field: &'static str, value: impl Into<i64>, min: i64, max: i64) -> Self {
        Self::Range {
            field,
            value: value.into(),
            min,
            max,
        }
    }

    /// Malformed schedule expression.
    #[must_use]
    pub fn cron(expression: &str, details: impl Into<String>) -> Self {
        Self::InvalidCron {
            expression: expression.to_string(),
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for HwError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for HwError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
