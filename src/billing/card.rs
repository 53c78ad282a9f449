use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::invoice::resolve_for_date;
use crate::errors::{BillingError, Result};
use crate::installments::InstallmentRecord;

/// Billing configuration of a credit card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardConfig {
    pub closing_day: u32,
    pub due_day: u32,
    pub credit_limit: Decimal,
}

impl CardConfig {
    pub fn new(closing_day: u32, due_day: u32, credit_limit: Decimal) -> Result<Self> {
        let card = Self {
            closing_day,
            due_day,
            credit_limit,
        };
        card.validate()?;
        Ok(card)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, day) in [("closing day", self.closing_day), ("due day", self.due_day)] {
            if !(1..=31).contains(&day) {
                warn!(field = name, day, "card day out of range");
                return Err(BillingError::InvalidConfig(format!(
                    "{name} must be within 1..=31, got {day}"
                )));
            }
        }
        if self.credit_limit < Decimal::ZERO {
            warn!(limit = %self.credit_limit, "negative credit limit");
            return Err(BillingError::InvalidConfig(format!(
                "credit limit must not be negative, got {}",
                self.credit_limit
            )));
        }
        Ok(())
    }
}

/// Sum of the installments that still weigh on the limit: everything dated from the start of
/// the invoice open on `today` onwards.
pub fn committed_amount(
    card: &CardConfig,
    records: &[InstallmentRecord],
    today: NaiveDate,
) -> Result<Decimal> {
    let current = resolve_for_date(card, today, today)?;
    Ok(records
        .iter()
        .filter(|record| record.date >= current.start_date)
        .map(|record| record.value)
        .sum())
}

/// Credit limit minus the committed amount. Goes negative when the card is over its limit.
pub fn available_limit(
    card: &CardConfig,
    records: &[InstallmentRecord],
    today: NaiveDate,
) -> Result<Decimal> {
    Ok(card.credit_limit - committed_amount(card, records, today)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installments::{schedule, Purchase};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_outside_calendar_are_rejected() {
        assert!(matches!(
            CardConfig::new(0, 10, dec!(100)),
            Err(BillingError::InvalidConfig(_))
        ));
        assert!(matches!(
            CardConfig::new(10, 32, dec!(100)),
            Err(BillingError::InvalidConfig(_))
        ));
        assert!(CardConfig::new(31, 31, dec!(0)).is_ok());
        assert!(CardConfig::new(10, 15, dec!(-1)).is_err());
    }

    #[test]
    fn paid_invoices_do_not_consume_the_limit() {
        let card = CardConfig::new(10, 15, dec!(2000)).unwrap();
        let purchase = Purchase::new("TV", dec!(1200), date(2025, 1, 5), 4, "Casa").unwrap();
        let records = schedule(&purchase).unwrap();

        // open invoice on 2025-03-01 started 2025-02-11; Jan 5 and Feb 5 are already billed
        let today = date(2025, 3, 1);
        assert_eq!(committed_amount(&card, &records, today).unwrap(), dec!(600));
        assert_eq!(available_limit(&card, &records, today).unwrap(), dec!(1400));
    }

    #[test]
    fn limit_may_go_negative() {
        let card = CardConfig::new(10, 15, dec!(100)).unwrap();
        let purchase = Purchase::new("Bike", dec!(250), date(2025, 3, 1), 1, "Lazer").unwrap();
        let records = schedule(&purchase).unwrap();
        let available = available_limit(&card, &records, date(2025, 3, 1)).unwrap();
        assert_eq!(available, dec!(-150));
    }
}
