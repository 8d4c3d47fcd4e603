//! Top-level CLI definition and dispatch.

#![allow(missing_docs)]

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use crate::core::config::Config;
use crate::core::errors::{HwError, Result};
use crate::logger::{self, LogLevel};
use crate::monitor::schedule::{CycleEntry, CycleScheduler, Decision, SkipReason};
use crate::time::{self, CalendarTime, Epoch, clock};

/// hostwatch: date/time parsing, timestamps, and cron scheduling for host checks.
#[derive(Parser)]
#[command(name = "hostwatch", version, about)]
pub struct Cli {
    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
    /// Raise log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Parse loose date/time text into calendar fields.
    Parse {
        text: String,
    },
    /// Convert date/time text to epoch seconds (UTC unless an offset is given).
    Timestamp {
        text: String,
    },
    /// Convert a local wall-clock reading to epoch seconds.
    Build {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    },
    /// Print the fixed-width timestamp for an instant (default: now).
    Stamp {
        /// UTC stamp with a trailing "GMT" instead of local time.
        #[arg(long)]
        gmt: bool,
        #[arg(allow_negative_numbers = true)]
        epoch: Option<Epoch>,
    },
    /// Render an instant in local time with a strftime-style pattern.
    Format {
        pattern: String,
        #[arg(allow_negative_numbers = true)]
        epoch: Option<Epoch>,
    },
    /// Render a number of seconds as "Nd, Nh, Nm".
    Uptime {
        seconds: u64,
    },
    /// Test a cron expression; exits 0 on match and 1 otherwise.
    Cron {
        expression: String,
        #[arg(allow_negative_numbers = true)]
        epoch: Option<Epoch>,
    },
    /// Show which configured checks run in upcoming cycles.
    Due {
        #[arg(long)]
        config: PathBuf,
        /// Number of consecutive cycles to evaluate.
        #[arg(long, default_value_t = 1)]
        cycle: u32,
        /// Instant of the first cycle (default: now).
        #[arg(allow_negative_numbers = true)]
        epoch: Option<Epoch>,
    },
    /// Generate shell completions.
    Completions {
        shell: Shell,
    },
}

/// How a successful command wants the process to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// `cron` evaluated cleanly but did not match.
    NoMatch,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => Self::SUCCESS,
            Outcome::NoMatch => Self::from(1),
        }
    }
}

/// Dispatch CLI commands.
///
/// # Errors
/// Returns the first `HwError` raised by the selected command.
pub fn run(cli: &Cli) -> Result<Outcome> {
    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let loaded = match &cli.command {
        Command::Due { config, .. } => Some(Config::load(config)?),
        _ => None,
    };
    let base = loaded
        .as_ref()
        .map_or(LogLevel::Warn, |config| config.logging.level);
    logger::init(base.raised(cli.verbose))?;

    match &cli.command {
        Command::Parse { text } => {
            let fields = time::parse_date_time(text)?;
            emit(cli.json, &fields, || describe_fields(&fields))?;
        }
        Command::Timestamp { text } => {
            let epoch = time::to_timestamp(text)?;
            emit(
                cli.json,
                &json!({ "input": text, "epoch": epoch }),
                || epoch.to_string(),
            )?;
        }
        Command::Build {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } => {
            let epoch = time::build(*year, *month, *day, *hour, *minute, *second)?;
            emit(cli.json, &json!({ "epoch": epoch }), || epoch.to_string())?;
        }
        Command::Stamp { gmt, epoch } => {
            let epoch = at_or_now(*epoch)?;
            let text = if *gmt {
                time::to_gmt_string(epoch)?
            } else {
                time::to_local_string(epoch)?
            };
            emit(
                cli.json,
                &json!({ "epoch": epoch, "stamp": text }),
                || text.clone(),
            )?;
        }
        Command::Format { pattern, epoch } => {
            let epoch = at_or_now(*epoch)?;
            let text = time::format(pattern, epoch);
            emit(
                cli.json,
                &json!({ "epoch": epoch, "pattern": pattern, "text": text }),
                || text.clone(),
            )?;
        }
        Command::Uptime { seconds } => {
            let text = time::uptime(*seconds);
            emit(
                cli.json,
                &json!({ "seconds": seconds, "uptime": text }),
                || text.clone(),
            )?;
        }
        Command::Cron { expression, epoch } => {
            let epoch = at_or_now(*epoch)?;
            let expr = expression.parse::<time::CronExpr>()?;
            let matched = expr.matches_at(epoch)?;
            emit(
                cli.json,
                &json!({ "expression": expr.to_string(), "epoch": epoch, "matches": matched }),
                || {
                    if matched {
                        "match".green().to_string()
                    } else {
                        "no match".yellow().to_string()
                    }
                },
            )?;
            if !matched {
                return Ok(Outcome::NoMatch);
            }
        }
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "hostwatch", &mut io::stdout());
        }
        Command::Due { cycle, epoch, .. } => {
            return due(cli.json, &loaded.unwrap_or_default(), *cycle, *epoch);
        }
    }
    Ok(Outcome::Done)
}

#[derive(Serialize)]
struct CycleReport {
    cycle: u32,
    epoch: Epoch,
    checks: Vec<CycleEntry>,
}

fn due(as_json: bool, config: &Config, cycles: u32, epoch: Option<Epoch>) -> Result<Outcome> {
    let start = at_or_now(epoch)?;
    let step = i64::try_from(config.daemon.cycle_secs).map_err(|_| HwError::InvalidConfig {
        details: format!("daemon.cycle_secs {} is too large", config.daemon.cycle_secs),
    })?;
    let mut scheduler = CycleScheduler::new(config.scheduled_checks()?);

    let mut reports = Vec::new();
    for cycle in 0..cycles {
        let at = start.saturating_add(step.saturating_mul(i64::from(cycle)));
        reports.push(CycleReport {
            cycle: cycle + 1,
            epoch: at,
            checks: scheduler.run_cycle(at)?,
        });
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(Outcome::Done);
    }
    for report in &reports {
        let stamp = time::to_local_string(report.epoch)?;
        println!("{} {} ({stamp})", "cycle".bold(), report.cycle);
        for entry in &report.checks {
            match entry.decision {
                Decision::Run => println!("  {}  {}", "run ".green(), entry.check),
                Decision::Skip(reason) => println!(
                    "  {}  {} ({})",
                    "skip".dimmed(),
                    entry.check,
                    describe_skip(reason)
                ),
            }
        }
    }
    Ok(Outcome::Done)
}

fn at_or_now(epoch: Option<Epoch>) -> Result<Epoch> {
    epoch.map_or_else(clock::now, Ok)
}

fn emit<T: Serialize>(as_json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn describe_fields(fields: &CalendarTime) -> String {
    let mut line = format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        fields.year, fields.month, fields.day, fields.hour, fields.minute, fields.second
    );
    if let Some(offset) = fields.utc_offset {
        let sign = if offset < 0 { '-' } else { '+' };
        let abs = offset.unsigned_abs();
        line.push_str(&format!(" {sign}{:02}:{:02}", abs / 3_600, abs % 3_600 / 60));
    }
    line
}

fn describe_skip(reason: SkipReason) -> String {
    match reason {
        SkipReason::Countdown { remaining } => format!("{remaining} more cycle(s)"),
        SkipReason::OutsideCron => "outside cron window".to_string(),
        SkipReason::InsideCron => "inside excluded cron window".to_string(),
        SkipReason::AlreadyRanThisMinute => "already ran this minute".to_string(),
    }
}
