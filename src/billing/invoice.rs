use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::card::CardConfig;
use crate::calendar::{clamped_date, shift_year_month};
use crate::clock::Clock;
use crate::errors::{BillingError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Open,
    Closed,
    Future,
}

impl InvoiceStatus {
    fn classify(start: NaiveDate, closing: NaiveDate, today: NaiveDate) -> InvoiceStatus {
        if today > closing {
            InvoiceStatus::Closed
        } else if today >= start {
            InvoiceStatus::Open
        } else {
            InvoiceStatus::Future
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Closed => "closed",
            InvoiceStatus::Future => "future",
        }
    }
}

/// The billing window of one invoice. `end_date` is the closing date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
}

impl InvoiceWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn closing_date(&self) -> NaiveDate {
        self.end_date
    }
}

/// Closing date of the invoice due in `month`/`year`.
///
/// A closing day after the due day means the invoice closes in the previous calendar month.
/// Equal days are treated as a same-month closing.
pub fn closing_date_for(card: &CardConfig, month: u32, year: i32) -> Result<NaiveDate> {
    card.validate()?;
    let (closing_year, closing_month) = if card.closing_day > card.due_day {
        previous_month(month, year)?
    } else {
        (year, month)
    };
    clamped_date(closing_year, closing_month, card.closing_day)
}

/// Resolves the invoice due in `month`/`year`, with its status relative to `today`.
pub fn resolve(card: &CardConfig, month: u32, year: i32, today: NaiveDate) -> Result<InvoiceWindow> {
    card.validate()?;
    let due_date = clamped_date(year, month, card.due_day)?;
    let end_date = closing_date_for(card, month, year)?;

    let (prev_year, prev_month) = previous_month(month, year)?;
    let start_date = closing_date_for(card, prev_month, prev_year)?
        .succ_opt()
        .ok_or_else(|| BillingError::InvalidArgument("invoice start out of range".into()))?;

    let status = InvoiceStatus::classify(start_date, end_date, today);
    debug!(
        month,
        year,
        %start_date,
        %end_date,
        %due_date,
        status = status.label(),
        "resolved invoice window"
    );
    Ok(InvoiceWindow {
        start_date,
        end_date,
        due_date,
        status,
    })
}

/// Same as [`resolve`], reading "today" from the injected clock.
pub fn resolve_with_clock(
    card: &CardConfig,
    month: u32,
    year: i32,
    clock: &dyn Clock,
) -> Result<InvoiceWindow> {
    resolve(card, month, year, clock.today())
}

/// Returns the invoice whose billing window contains `date`.
pub fn resolve_for_date(card: &CardConfig, date: NaiveDate, today: NaiveDate) -> Result<InvoiceWindow> {
    card.validate()?;
    let closing_this_month = clamped_date(date.year(), date.month(), card.closing_day)?;
    let (closing_year, closing_month) = if date <= closing_this_month {
        (date.year(), date.month())
    } else {
        next_month(date.month(), date.year())?
    };
    let (due_year, due_month) = if card.closing_day > card.due_day {
        next_month(closing_month, closing_year)?
    } else {
        (closing_year, closing_month)
    };
    resolve(card, due_month, due_year, today)
}

fn previous_month(month: u32, year: i32) -> Result<(i32, u32)> {
    shift_year_month(year, month, -1)
        .ok_or_else(|| BillingError::InvalidArgument(format!("year {year} is out of range")))
}

fn next_month(month: u32, year: i32) -> Result<(i32, u32)> {
    shift_year_month(year, month, 1)
        .ok_or_else(|| BillingError::InvalidArgument(format!("year {year} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card(closing_day: u32, due_day: u32) -> CardConfig {
        CardConfig::new(closing_day, due_day, dec!(5000)).unwrap()
    }

    #[test]
    fn same_month_closing_window() {
        let window = resolve(&card(10, 15), 3, 2025, date(2025, 1, 1)).unwrap();
        assert_eq!(window.start_date, date(2025, 2, 11));
        assert_eq!(window.end_date, date(2025, 3, 10));
        assert_eq!(window.due_date, date(2025, 3, 15));
        assert_eq!(window.status, InvoiceStatus::Future);
    }

    #[test]
    fn previous_month_closing_window() {
        let window = resolve(&card(25, 5), 3, 2025, date(2025, 3, 1)).unwrap();
        assert_eq!(window.end_date, date(2025, 2, 25));
        assert_eq!(window.start_date, date(2025, 1, 26));
        assert_eq!(window.due_date, date(2025, 3, 5));
        assert_eq!(window.status, InvoiceStatus::Closed);
    }

    #[test]
    fn january_due_closes_in_previous_year() {
        let window = resolve(&card(28, 7), 1, 2025, date(2024, 12, 1)).unwrap();
        assert_eq!(window.end_date, date(2024, 12, 28));
        assert_eq!(window.start_date, date(2024, 11, 29));
        assert_eq!(window.status, InvoiceStatus::Open);
    }

    #[test]
    fn equal_days_close_in_the_due_month() {
        let window = resolve(&card(10, 10), 4, 2025, date(2025, 4, 10)).unwrap();
        assert_eq!(window.end_date, date(2025, 4, 10));
        assert_eq!(window.due_date, date(2025, 4, 10));
        assert_eq!(window.start_date, date(2025, 3, 11));
        assert_eq!(window.status, InvoiceStatus::Open);
    }

    #[test]
    fn month_end_closing_windows_tile_without_overlap() {
        let cfg = card(31, 31);
        let today = date(2025, 1, 1);
        let march = resolve(&cfg, 3, 2025, today).unwrap();
        let april = resolve(&cfg, 4, 2025, today).unwrap();
        assert_eq!(march.end_date, date(2025, 3, 31));
        assert_eq!(april.start_date, date(2025, 4, 1));
        assert_eq!(april.end_date, date(2025, 4, 30));
        assert_eq!(april.due_date, date(2025, 4, 30));

        let february = resolve(&cfg, 2, 2025, today).unwrap();
        assert_eq!(february.end_date, date(2025, 2, 28));
        assert_eq!(march.start_date, date(2025, 3, 1));
    }

    #[test]
    fn status_boundaries() {
        let cfg = card(10, 15);
        let start = date(2025, 2, 11);
        let closing = date(2025, 3, 10);
        assert_eq!(resolve(&cfg, 3, 2025, start).unwrap().status, InvoiceStatus::Open);
        assert_eq!(resolve(&cfg, 3, 2025, closing).unwrap().status, InvoiceStatus::Open);
        assert_eq!(
            resolve(&cfg, 3, 2025, date(2025, 3, 11)).unwrap().status,
            InvoiceStatus::Closed
        );
        assert_eq!(
            resolve(&cfg, 3, 2025, date(2025, 2, 10)).unwrap().status,
            InvoiceStatus::Future
        );
    }

    #[test]
    fn window_ordering_holds_for_all_day_pairs() {
        let today = date(2025, 6, 1);
        for closing_day in 1..=31 {
            for due_day in 1..=31 {
                let cfg = card(closing_day, due_day);
                for month in 1..=12 {
                    let window = resolve(&cfg, month, 2025, today).unwrap();
                    assert!(window.start_date <= window.end_date);
                    if closing_day <= due_day {
                        // both days may clamp onto the same short-month end
                        assert!(window.end_date <= window.due_date);
                    } else {
                        assert!(window.end_date < window.due_date);
                        assert!(window.end_date.month() != window.due_date.month());
                    }
                }
            }
        }
    }

    #[test]
    fn clock_is_injected() {
        let clock = FixedClock::new(date(2025, 3, 1));
        let window = resolve_with_clock(&card(10, 15), 3, 2025, &clock).unwrap();
        assert_eq!(window.status, InvoiceStatus::Open);
    }

    #[test]
    fn purchase_date_maps_to_its_invoice() {
        let cfg = card(25, 5);
        let today = date(2025, 1, 1);
        let before = resolve_for_date(&cfg, date(2025, 1, 25), today).unwrap();
        assert_eq!(before.due_date, date(2025, 2, 5));
        let after = resolve_for_date(&cfg, date(2025, 1, 26), today).unwrap();
        assert_eq!(after.due_date, date(2025, 3, 5));
        assert!(after.contains(date(2025, 1, 26)));

        let same_month = card(10, 15);
        let window = resolve_for_date(&same_month, date(2025, 12, 20), today).unwrap();
        assert_eq!(window.due_date, date(2026, 1, 15));
        assert!(window.contains(date(2025, 12, 20)));
    }

    #[test]
    fn invalid_input_is_rejected() {
        let cfg = CardConfig {
            closing_day: 0,
            due_day: 10,
            credit_limit: dec!(100),
        };
        assert!(matches!(
            resolve(&cfg, 3, 2025, date(2025, 1, 1)),
            Err(BillingError::InvalidConfig(_))
        ));
        assert!(matches!(
            resolve(&card(10, 15), 13, 2025, date(2025, 1, 1)),
            Err(BillingError::InvalidArgument(_))
        ));
    }
}
