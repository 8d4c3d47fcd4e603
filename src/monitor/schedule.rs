//! Per-check `every` rules: which checks run in a given monitoring cycle.

#![allow(missing_docs)]

use serde::Serialize;
use tracing::debug;

use crate::core::errors::{HwError, Result};
use crate::time::{CronExpr, Epoch, local_fields};

/// How often a check runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Every {
    /// Every cycle.
    Always,
    /// Every n-th cycle, counted per check.
    Cycles(u32),
    /// Only in cycles whose local time matches, at most once per minute.
    Cron(CronExpr),
    /// Only in cycles whose local time does not match.
    NotInCron(CronExpr),
}

/// Why a check was left out of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Countdown { remaining: u32 },
    OutsideCron,
    InsideCron,
    AlreadyRanThisMinute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Run,
    Skip(SkipReason),
}

impl Decision {
    #[must_use]
    pub const fn runs(self) -> bool {
        matches!(self, Self::Run)
    }
}

/// Mutable bookkeeping a check carries from cycle to cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckState {
    cycles_seen: u32,
    last_cron_minute: Option<i64>,
}

/// A named check with its schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCheck {
    pub name: String,
    pub every: Every,
}

impl ScheduledCheck {
    pub fn new(name: impl Into<String>, every: Every) -> Result<Self> {
        let name = name.into();
        if matches!(every, Every::Cycles(0)) {
            return Err(HwError::InvalidConfig {
                details: format!("check {name}: every cycles must be at least 1"),
            });
        }
        Ok(Self { name, every })
    }

    /// Decide whether the check runs in the cycle happening at `now`.
    pub fn is_due(&self, now: Epoch, state: &mut CheckState) -> Result<Decision> {
        let decision = match &self.every {
            Every::Always => Decision::Run,
            Every::Cycles(every) => {
                state.cycles_seen += 1;
                if state.cycles_seen >= *every {
                    state.cycles_seen = 0;
                    Decision::Run
                } else {
                    Decision::Skip(SkipReason::Countdown {
                        remaining: every - state.cycles_seen,
                    })
                }
            }
            Every::Cron(expr) => {
                let minute = now.div_euclid(60);
                if !expr.matches_breakdown(&local_fields(now)?) {
                    Decision::Skip(SkipReason::OutsideCron)
                } else if state.last_cron_minute == Some(minute) {
                    Decision::Skip(SkipReason::AlreadyRanThisMinute)
                } else {
                    state.last_cron_minute = Some(minute);
                    Decision::Run
                }
            }
            Every::NotInCron(expr) => {
                if expr.matches_breakdown(&local_fields(now)?) {
                    Decision::Skip(SkipReason::InsideCron)
                } else {
                    Decision::Run
                }
            }
        };

        if let Decision::Skip(reason) = decision {
            debug!(check = %self.name, ?reason, now, "check skipped this cycle");
        }
        Ok(decision)
    }
}

/// Outcome for one check in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleEntry {
    pub check: String,
    #[serde(flatten)]
    pub decision: Decision,
}

/// All checks of a configuration with their per-check state.
#[derive(Debug, Clone, Default)]
pub struct CycleScheduler {
    checks: Vec<(ScheduledCheck, CheckState)>,
}

impl CycleScheduler {
    #[must_use]
    pub fn new(checks: Vec<ScheduledCheck>) -> Self {
        Self {
            checks: checks
                .into_iter()
                .map(|check| (check, CheckState::default()))
                .collect(),
        }
    }

    /// Evaluate every check for the cycle at `now`, in configuration order.
    pub fn run_cycle(&mut self, now: Epoch) -> Result<Vec<CycleEntry>> {
        self.checks
            .iter_mut()
            .map(|(check, state)| {
                Ok(CycleEntry {
                    check: check.name.clone(),
                    decision: check.is_due(now, state)?,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
