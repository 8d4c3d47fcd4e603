//! TOML configuration: daemon cadence, logging, and per-check schedules.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{HwError, Result};
use crate::logger::LogLevel;
use crate::monitor::schedule::{Every, ScheduledCheck};
use crate::time::CronExpr;

/// Default polling interval in seconds.
pub const DEFAULT_CYCLE_SECS: u64 = 30;

/// Full hostwatch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub daemon: DaemonConfig,
    pub logging: LoggingConfig,
    #[serde(rename = "check")]
    pub checks: Vec<CheckConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Seconds between monitoring cycles.
    pub cycle_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            cycle_secs: DEFAULT_CYCLE_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

/// One `[[check]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    pub name: String,
    /// Absent means every cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every: Option<EverySpec>,
}

/// Textual form of a check's `every` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EverySpec {
    Cycles(u32),
    Cron(String),
    NotInCron(String),
}

impl EverySpec {
    fn resolve(&self) -> Result<Every> {
        Ok(match self {
            Self::Cycles(n) => Every::Cycles(*n),
            Self::Cron(text) => Every::Cron(CronExpr::parse(text)?),
            Self::NotInCron(text) => Every::NotInCron(CronExpr::parse(text)?),
        })
    }
}

impl Config {
    /// Read, parse, and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(HwError::MissingConfig {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(HwError::io(path, err)),
        };
        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks that TOML decoding cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.daemon.cycle_secs == 0 {
            return Err(HwError::InvalidConfig {
                details: "daemon.cycle_secs must be greater than 0".to_string(),
            });
        }
        self.scheduled_checks().map(|_| ())
    }

    /// Resolve every `[[check]]` into a schedulable check.
    pub fn scheduled_checks(&self) -> Result<Vec<ScheduledCheck>> {
        let mut seen = HashSet::new();
        self.checks
            .iter()
            .map(|check| {
                let name = check.name.trim();
                if name.is_empty() {
                    return Err(HwError::InvalidConfig {
                        details: "check name must not be empty".to_string(),
                    });
                }
                if !seen.insert(name) {
                    return Err(HwError::InvalidConfig {
                        details: format!("duplicate check name {name:?}"),
                    });
                }
                let every = match &check.every {
                    None => Every::Always,
                    Some(spec) => spec.resolve().map_err(|err| HwError::InvalidConfig {
                        details: format!("check {name:?}: {err}"),
                    })?,
                };
                ScheduledCheck::new(name, every)
            })
            .collect()
    }
}
