use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{card::CardConfig, invoice::resolve, InvoiceWindow};
use crate::errors::Result;
use crate::installments::InstallmentRecord;

/// The installments billed in one invoice, with their exact total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceStatement {
    pub window: InvoiceWindow,
    pub items: Vec<InstallmentRecord>,
    pub total: Decimal,
}

/// Records dated inside the window, in date order.
pub fn installments_in_window(
    window: &InvoiceWindow,
    records: &[InstallmentRecord],
) -> Vec<InstallmentRecord> {
    let mut items: Vec<InstallmentRecord> = records
        .iter()
        .filter(|record| window.contains(record.date))
        .cloned()
        .collect();
    items.sort_by_key(|record| record.date);
    items
}

pub fn statement(
    card: &CardConfig,
    month: u32,
    year: i32,
    today: NaiveDate,
    records: &[InstallmentRecord],
) -> Result<InvoiceStatement> {
    let window = resolve(card, month, year, today)?;
    let items = installments_in_window(&window, records);
    let total = items.iter().map(|record| record.value).sum();
    Ok(InvoiceStatement {
        window,
        items,
        total,
    })
}
