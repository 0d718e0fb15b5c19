//! Date and time expressions
//!
//! Firebird has `EXTRACT` but no function that truncates a timestamp to a
//! granularity. Truncation is rebuilt from `EXTRACT` calls concatenated into
//! a timestamp literal and cast back.

use chrono::Duration;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Time component used for extraction and truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    WeekDay,
}

impl TemporalUnit {
    /// Lookup name used by the generic layer
    pub fn lookup_name(&self) -> &'static str {
        match self {
            TemporalUnit::Year => "year",
            TemporalUnit::Month => "month",
            TemporalUnit::Day => "day",
            TemporalUnit::Hour => "hour",
            TemporalUnit::Minute => "minute",
            TemporalUnit::Second => "second",
            TemporalUnit::WeekDay => "week_day",
        }
    }
}

impl fmt::Display for TemporalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lookup_name())
    }
}

impl FromStr for TemporalUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(TemporalUnit::Year),
            "month" => Ok(TemporalUnit::Month),
            "day" => Ok(TemporalUnit::Day),
            "hour" => Ok(TemporalUnit::Hour),
            "minute" => Ok(TemporalUnit::Minute),
            "second" => Ok(TemporalUnit::Second),
            "week_day" => Ok(TemporalUnit::WeekDay),
            other => Err(Error::UnsupportedGranularity(other.to_string())),
        }
    }
}

/// One step of a truncation chain: the literal joining it to the previous
/// step, and the literal completing the timestamp when it is the last step.
struct TruncStep {
    unit: TemporalUnit,
    joiner: &'static str,
    padding: &'static str,
}

/// Timestamp truncation, coarsest first
const DATETIME_TRUNC_STEPS: [TruncStep; 6] = [
    TruncStep { unit: TemporalUnit::Year, joiner: "", padding: "-01-01 00:00:00" },
    TruncStep { unit: TemporalUnit::Month, joiner: "-", padding: "-01 00:00:00" },
    TruncStep { unit: TemporalUnit::Day, joiner: "-", padding: " 00:00:00" },
    TruncStep { unit: TemporalUnit::Hour, joiner: " ", padding: ":00:00" },
    TruncStep { unit: TemporalUnit::Minute, joiner: ":", padding: ":00" },
    TruncStep { unit: TemporalUnit::Second, joiner: ":", padding: "" },
];

/// Date truncation, coarsest first
const DATE_TRUNC_STEPS: [TruncStep; 3] = [
    TruncStep { unit: TemporalUnit::Year, joiner: "", padding: "-01-01" },
    TruncStep { unit: TemporalUnit::Month, joiner: "-", padding: "-01" },
    TruncStep { unit: TemporalUnit::Day, joiner: "-", padding: "" },
];

/// `EXTRACT` expression for a unit.
///
/// Firebird's WEEKDAY counts from 0 (Sunday); callers expect 1-based days, so
/// the result is shifted by one.
pub fn extract_sql(unit: TemporalUnit, expr: &str) -> String {
    match unit {
        TemporalUnit::WeekDay => format!("EXTRACT(WEEKDAY FROM {}) + 1", expr),
        other => format!(
            "EXTRACT({} FROM {})",
            other.lookup_name().to_uppercase(),
            expr
        ),
    }
}

/// Truncate a timestamp expression to `unit`
pub fn datetime_trunc_sql(unit: TemporalUnit, expr: &str) -> Result<String> {
    let chain = trunc_chain(&DATETIME_TRUNC_STEPS, unit, expr)?;
    Ok(format!("CAST({} AS TIMESTAMP)", chain))
}

/// Truncate a date expression to `unit` (year, month or day)
pub fn date_trunc_sql(unit: TemporalUnit, expr: &str) -> Result<String> {
    let chain = trunc_chain(&DATE_TRUNC_STEPS, unit, expr)?;
    Ok(format!("CAST({} AS DATE)", chain))
}

fn trunc_chain(steps: &[TruncStep], unit: TemporalUnit, expr: &str) -> Result<String> {
    let position = steps
        .iter()
        .position(|step| step.unit == unit)
        .ok_or_else(|| Error::UnsupportedGranularity(unit.to_string()))?;

    let mut parts = Vec::with_capacity(position * 2 + 2);
    for step in &steps[..=position] {
        if !step.joiner.is_empty() {
            parts.push(format!("'{}'", step.joiner));
        }
        parts.push(format!("EXTRACT({} FROM {})", step.unit.lookup_name(), expr));
    }

    let padding = steps[position].padding;
    if !padding.is_empty() {
        parts.push(format!("'{}'", padding));
    }

    Ok(parts.join("||"))
}

/// Direction of interval arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    Add,
    Subtract,
}

/// Shift a date/time expression by a duration with `DATEADD`
pub fn date_interval_sql(expr: &str, connector: Connector, duration: Duration) -> String {
    let sign = match connector {
        Connector::Add => 1,
        Connector::Subtract => -1,
    };

    let whole_days = duration.num_days();
    if duration == Duration::days(whole_days) {
        return format!("DATEADD({} DAY TO {})", sign * whole_days, expr);
    }

    format!(
        "DATEADD({} MILLISECOND TO {})",
        sign * duration.num_milliseconds(),
        expr
    )
}
