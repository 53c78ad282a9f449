//! Calendar stepping with an explicit month-end policy.
//!
//! Stepping by months or years never rolls into the following month: when the target month is
//! shorter than the original day-of-month, the result is clamped to the target month's last day
//! (Jan 31 + 1 month = Feb 28, or Feb 29 in leap years).

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{BillingError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(TimeUnit::Day),
            "week" | "weeks" => Ok(TimeUnit::Week),
            "month" | "months" => Ok(TimeUnit::Month),
            "year" | "years" => Ok(TimeUnit::Year),
            other => Err(BillingError::InvalidArgument(format!(
                "unknown time unit `{other}`"
            ))),
        }
    }
}

/// Moves `date` by `steps` units; negative steps move backwards under the same clamp policy.
pub fn advance(date: NaiveDate, steps: i32, unit: TimeUnit) -> Result<NaiveDate> {
    if steps == 0 {
        return Ok(date);
    }
    let moved = match unit {
        TimeUnit::Day => date.checked_add_signed(Duration::days(steps as i64)),
        TimeUnit::Week => date.checked_add_signed(Duration::weeks(steps as i64)),
        TimeUnit::Month => shift_month(date, steps as i64),
        TimeUnit::Year => shift_month(date, steps as i64 * 12),
    };
    moved.ok_or_else(|| {
        BillingError::InvalidArgument(format!(
            "moving {date} by {steps} {unit:?} leaves the supported calendar"
        ))
    })
}

/// Number of days of the given month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_next.pred_opt().map(|last| last.day())
}

/// Builds `year-month-day`, clamping `day` to the month's length.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(BillingError::InvalidArgument(format!(
            "month must be within 1..=12, got {month}"
        )));
    }
    let last = days_in_month(year, month)
        .ok_or_else(|| BillingError::InvalidArgument(format!("year {year} is out of range")))?;
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
        .ok_or_else(|| BillingError::InvalidArgument(format!("invalid date {year}-{month}-{day}")))
}

/// Returns `(year, month)` shifted by `months`, e.g. `(2025, 1)` minus one is `(2024, 12)`.
pub fn shift_year_month(year: i32, month: u32, months: i64) -> Option<(i32, u32)> {
    let index = year as i64 * 12 + (month as i64 - 1) + months;
    let new_year = i32::try_from(index.div_euclid(12)).ok()?;
    let new_month = index.rem_euclid(12) as u32 + 1;
    Some((new_year, new_month))
}

fn shift_month(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let (year, month) = shift_year_month(date.year(), date.month(), months)?;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// A cadence such as "every 2 weeks".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self { every, unit }
    }

    pub fn next_date(&self, from: NaiveDate) -> Result<NaiveDate> {
        self.add_to(from, 1)
    }

    /// Applies the interval `steps` times as one clamped move.
    pub fn add_to(&self, from: NaiveDate, steps: i32) -> Result<NaiveDate> {
        let total = (self.every as i64)
            .checked_mul(steps as i64)
            .and_then(|value| i32::try_from(value).ok())
            .ok_or_else(|| BillingError::InvalidArgument("interval step overflow".into()))?;
        advance(from, total, self.unit)
    }

    pub fn label(&self) -> String {
        match (self.every, self.unit) {
            (1, TimeUnit::Day) => "Daily".into(),
            (1, TimeUnit::Week) => "Weekly".into(),
            (1, TimeUnit::Month) => "Monthly".into(),
            (1, TimeUnit::Year) => "Yearly".into(),
            (n, unit) => format!("Every {} {:?}{}", n, unit, if n > 1 { "s" } else { "" }),
        }
    }
}
