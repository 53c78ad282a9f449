//! Unified forecast of pending installments and projected recurring expenses.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{advance, TimeUnit};
use crate::errors::{BillingError, Result};
use crate::installments::InstallmentRecord;
use crate::recurring::{project, RecurringExpenseDef};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForecastOrigin {
    Installment,
    Recurring,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastItem {
    pub date: NaiveDate,
    pub description: String,
    pub value: Decimal,
    pub origin: ForecastOrigin,
    pub category: String,
}

impl From<&InstallmentRecord> for ForecastItem {
    fn from(record: &InstallmentRecord) -> Self {
        ForecastItem {
            date: record.date,
            description: record.description.clone(),
            value: record.value,
            origin: ForecastOrigin::Installment,
            category: record.category.clone(),
        }
    }
}

/// Inclusive date range a forecast covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForecastWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ForecastWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(BillingError::InvalidArgument(
                "forecast window end must not precede its start".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// `[today, today + months]`.
    pub fn months_ahead(today: NaiveDate, months: u32) -> Result<Self> {
        let months = i32::try_from(months)
            .map_err(|_| BillingError::InvalidArgument("forecast horizon too large".into()))?;
        Self::new(today, advance(today, months, TimeUnit::Month)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Merges installments and recurring occurrences into one list sorted by date.
///
/// The sort is stable: on equal dates installments come first, each group in input order.
pub fn aggregate(
    installments: &[InstallmentRecord],
    recurring: Vec<ForecastItem>,
) -> Vec<ForecastItem> {
    let mut items: Vec<ForecastItem> = installments.iter().map(ForecastItem::from).collect();
    items.extend(recurring);
    items.sort_by_key(|item| item.date);
    items
}

/// Restricts stored installments to the window, projects every definition and aggregates.
pub fn build_forecast(
    definitions: &[RecurringExpenseDef],
    installments: &[InstallmentRecord],
    window: ForecastWindow,
) -> Result<Vec<ForecastItem>> {
    let pending: Vec<InstallmentRecord> = installments
        .iter()
        .filter(|record| window.contains(record.date))
        .cloned()
        .collect();

    let mut recurring = Vec::new();
    for definition in definitions {
        recurring.extend(project(definition, window.start, window.end)?);
    }

    let items = aggregate(&pending, recurring);
    debug!(
        start = %window.start,
        end = %window.end,
        installments = pending.len(),
        items = items.len(),
        "built forecast"
    );
    Ok(items)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastTotals {
    pub count: usize,
    pub installments: Decimal,
    pub recurring: Decimal,
    pub total: Decimal,
}

impl ForecastTotals {
    pub fn from_items(items: &[ForecastItem]) -> Self {
        let mut totals = ForecastTotals {
            count: items.len(),
            ..ForecastTotals::default()
        };
        for item in items {
            match item.origin {
                ForecastOrigin::Installment => totals.installments += item.value,
                ForecastOrigin::Recurring => totals.recurring += item.value,
            }
        }
        totals.total = totals.installments + totals.recurring;
        totals
    }
}

/// Sums forecast values per `(year, month)`.
pub fn monthly_totals(items: &[ForecastItem]) -> BTreeMap<(i32, u32), Decimal> {
    let mut totals = BTreeMap::new();
    for item in items {
        *totals
            .entry((item.date.year(), item.date.month()))
            .or_insert(Decimal::ZERO) += item.value;
    }
    totals
}
