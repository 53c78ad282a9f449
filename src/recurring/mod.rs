//! Projection of recurring expenses into a bounded date window.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::{TimeInterval, TimeUnit};
use crate::errors::{BillingError, Result};
use crate::forecast::{ForecastItem, ForecastOrigin};
use crate::money;

/// Supported recurrence cadences. Anything else is rejected when the definition is parsed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn unit(&self) -> TimeUnit {
        match self {
            Frequency::Weekly => TimeUnit::Week,
            Frequency::Monthly => TimeUnit::Month,
            Frequency::Yearly => TimeUnit::Year,
        }
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(1, self.unit())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = BillingError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => {
                warn!(frequency = raw, "rejecting unsupported frequency");
                Err(BillingError::UnsupportedFrequency(raw.to_string()))
            }
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = BillingError;

    fn try_from(raw: String) -> Result<Self> {
        raw.parse()
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}

/// A recurring expense. Projections are recomputed from it on every call and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringExpenseDef {
    pub description: String,
    pub value: Decimal,
    pub anchor_date: NaiveDate,
    pub frequency: Frequency,
    pub category: String,
}

impl RecurringExpenseDef {
    pub fn new(
        description: impl Into<String>,
        value: Decimal,
        anchor_date: NaiveDate,
        frequency: Frequency,
        category: impl Into<String>,
    ) -> Result<Self> {
        let def = Self {
            description: description.into(),
            value,
            anchor_date,
            frequency,
            category: category.into(),
        };
        def.validate()?;
        Ok(def)
    }

    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(BillingError::InvalidArgument(
                "recurring expense description must not be empty".into(),
            ));
        }
        if self.value <= Decimal::ZERO || !money::is_cent_precise(self.value) {
            warn!(value = %self.value, "invalid recurring expense value");
            return Err(BillingError::InvalidArgument(format!(
                "recurring expense value must be a positive amount in cents, got {}",
                self.value
            )));
        }
        Ok(())
    }

    fn item(&self, date: NaiveDate) -> ForecastItem {
        ForecastItem {
            date,
            description: self.description.clone(),
            value: self.value,
            origin: ForecastOrigin::Recurring,
            category: self.category.clone(),
        }
    }
}

/// Emits every occurrence of `def` inside `[window_start, window_end]`, in date order.
///
/// Each occurrence is one cadence step after the previous one, so a month-end anchor that
/// clamps once keeps the clamped day from then on.
pub fn project(
    def: &RecurringExpenseDef,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<ForecastItem>> {
    if window_start > window_end {
        return Err(BillingError::InvalidArgument(format!(
            "projection window ends ({window_end}) before it starts ({window_start})"
        )));
    }

    let interval = def.frequency.interval();
    let mut cursor = def.anchor_date;
    while cursor < window_start {
        cursor = interval.next_date(cursor)?;
    }

    let mut items = Vec::new();
    while cursor <= window_end {
        items.push(def.item(cursor));
        match interval.next_date(cursor) {
            Ok(next) => cursor = next,
            Err(_) => break,
        }
    }

    debug!(
        description = %def.description,
        frequency = %def.frequency,
        %window_start,
        %window_end,
        occurrences = items.len(),
        "projected recurring expense"
    );
    Ok(items)
}
