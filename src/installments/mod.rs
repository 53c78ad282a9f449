//! Expansion of card purchases into dated installment records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::calendar::{advance, TimeUnit};
use crate::errors::{BillingError, Result};
use crate::money;

/// A purchase as entered by the user, before expansion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Purchase {
    pub description: String,
    pub total_value: Decimal,
    pub purchase_date: NaiveDate,
    pub installment_count: u32,
    pub category: String,
}

impl Purchase {
    pub fn new(
        description: impl Into<String>,
        total_value: Decimal,
        purchase_date: NaiveDate,
        installment_count: u32,
        category: impl Into<String>,
    ) -> Result<Self> {
        let purchase = Self {
            description: description.into(),
            total_value,
            purchase_date,
            installment_count,
            category: category.into(),
        };
        purchase.validate()?;
        Ok(purchase)
    }

    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            warn!("purchase without description");
            return Err(BillingError::InvalidArgument(
                "purchase description must not be empty".into(),
            ));
        }
        if self.total_value <= Decimal::ZERO {
            warn!(total = %self.total_value, "purchase with non-positive value");
            return Err(BillingError::InvalidArgument(format!(
                "purchase value must be positive, got {}",
                self.total_value
            )));
        }
        if self.installment_count < 1 {
            warn!("purchase with zero installments");
            return Err(BillingError::InvalidArgument(
                "installment count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// One dated charge produced from a purchase. Records are never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallmentRecord {
    pub purchase_id: Uuid,
    pub description: String,
    pub value: Decimal,
    pub date: NaiveDate,
    pub installment_index: u32,
    pub installment_count: u32,
    pub original_total: Decimal,
    pub category: String,
}

impl InstallmentRecord {
    pub fn is_last(&self) -> bool {
        self.installment_index == self.installment_count
    }
}

/// Expands a purchase into `installment_count` monthly records whose values sum to the total.
///
/// Installment `i` (zero based) is dated `purchase_date + i months`, clamped to month end.
pub fn schedule(purchase: &Purchase) -> Result<Vec<InstallmentRecord>> {
    purchase.validate()?;
    let count = purchase.installment_count;
    let values = money::split(purchase.total_value, count)?;
    let purchase_id = Uuid::new_v4();

    let mut records = Vec::with_capacity(values.len());
    for (offset, value) in values.into_iter().enumerate() {
        let index = offset as u32 + 1;
        let date = advance(purchase.purchase_date, offset as i32, TimeUnit::Month)?;
        let description = if count > 1 {
            format!("{} ({}/{})", purchase.description, index, count)
        } else {
            purchase.description.clone()
        };
        records.push(InstallmentRecord {
            purchase_id,
            description,
            value,
            date,
            installment_index: index,
            installment_count: count,
            original_total: purchase.total_value,
            category: purchase.category.clone(),
        });
    }

    debug!(
        %purchase_id,
        total = %purchase.total_value,
        count,
        first = %purchase.purchase_date,
        "scheduled purchase installments"
    );
    Ok(records)
}
