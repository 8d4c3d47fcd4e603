//! Five-field cron expressions: `minute hour day month weekday`.
//!
//! Each field is `*` or a comma list of values and inclusive `a-b` ranges.
//! There is no step syntax and values are not checked against calendar
//! bounds; a value that can never occur simply never matches.

use std::fmt;
use std::str::FromStr;

use super::calendar::{Breakdown, Epoch, local_fields};
use crate::core::errors::{HwError, Result};

/// Field positions, in expression order.
pub const FIELD_NAMES: [&str; 5] = ["minute", "hour", "day", "month", "weekday"];

/// One alternative inside a field's comma list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    /// Exact value.
    Value(u32),
    /// Inclusive on both ends; a reversed range matches nothing.
    Range(u32, u32),
}

impl Alternative {
    const fn contains(self, value: u32) -> bool {
        match self {
            Self::Value(expected) => expected == value,
            Self::Range(from, to) => from <= value && value <= to,
        }
    }
}

/// A single cron field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field {
    /// `*`: any value.
    #[default]
    Wildcard,
    /// Never empty.
    AnyOf(Vec<Alternative>),
}

impl Field {
    /// Whether `value` satisfies this field.
    #[must_use]
    pub fn accepts(&self, value: u32) -> bool {
        match self {
            Self::Wildcard => true,
            Self::AnyOf(alternatives) => alternatives.iter().any(|alt| alt.contains(value)),
        }
    }
}

/// Parsed schedule expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    source: String,
    fields: [Field; 5],
}

impl CronExpr {
    /// Parse a five-field expression.
    pub fn parse(text: &str) -> Result<Self> {
        let segments: Vec<&str> = text.split_ascii_whitespace().collect();
        if segments.len() != FIELD_NAMES.len() {
            return Err(HwError::cron(
                text,
                format!("expected 5 fields, found {}", segments.len()),
            ));
        }

        let mut fields: [Field; 5] = Default::default();
        for ((slot, segment), name) in fields.iter_mut().zip(&segments).zip(FIELD_NAMES) {
            *slot = parse_field(segment).map_err(|details| {
                HwError::cron(text, format!("{name} field {segment:?}: {details}"))
            })?;
        }

        Ok(Self {
            source: segments.join(" "),
            fields,
        })
    }

    /// Match against precomputed `[minute, hour, day, month, weekday]`.
    #[must_use]
    pub fn matches_values(&self, values: [u32; 5]) -> bool {
        self.fields
            .iter()
            .zip(values)
            .all(|(field, value)| field.accepts(value))
    }

    /// Match against a calendar breakdown.
    #[must_use]
    pub fn matches_breakdown(&self, fields: &Breakdown) -> bool {
        self.matches_values([
            fields.minute,
            fields.hour,
            fields.day,
            fields.month,
            fields.weekday,
        ])
    }

    /// Match against `epoch` read in host-local time.
    pub fn matches_at(&self, epoch: Epoch) -> Result<bool> {
        Ok(self.matches_breakdown(&local_fields(epoch)?))
    }
}

impl FromStr for CronExpr {
    type Err = HwError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_field(segment: &str) -> std::result::Result<Field, String> {
    if segment == "*" {
        return Ok(Field::Wildcard);
    }
    segment
        .split(',')
        .map(parse_alternative)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Field::AnyOf)
}

fn parse_alternative(item: &str) -> std::result::Result<Alternative, String> {
    match item.split_once('-') {
        None => parse_number(item).map(Alternative::Value),
        Some((from, to)) => Ok(Alternative::Range(parse_number(from)?, parse_number(to)?)),
    }
}

fn parse_number(digits: &str) -> std::result::Result<u32, String> {
    if digits.is_empty() {
        return Err("missing number".to_string());
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(format!("unexpected character {bad:?}"));
    }
    digits
        .parse()
        .map_err(|_| format!("number {digits} is too large"))
}

/// Whether `expression` matches `epoch` in host-local time.
pub fn matches(expression: &str, epoch: Epoch) -> Result<bool> {
    CronExpr::parse(expression)?.matches_at(epoch)
}
