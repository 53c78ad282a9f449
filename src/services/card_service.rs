use rust_decimal::Decimal;
use uuid::Uuid;

use super::store::BillingStore;
use crate::billing::{self, InvoiceStatement, InvoiceWindow};
use crate::clock::Clock;
use crate::errors::Result;

pub struct CardService;

impl CardService {
    pub fn invoice(
        store: &dyn BillingStore,
        card_id: Uuid,
        month: u32,
        year: i32,
        clock: &dyn Clock,
    ) -> Result<InvoiceWindow> {
        let card = store.card(card_id)?;
        billing::resolve_with_clock(&card, month, year, clock)
    }

    pub fn statement(
        store: &dyn BillingStore,
        card_id: Uuid,
        month: u32,
        year: i32,
        clock: &dyn Clock,
    ) -> Result<InvoiceStatement> {
        let card = store.card(card_id)?;
        let records = store.card_installments(card_id)?;
        billing::statement(&card, month, year, clock.today(), &records)
    }

    /// The invoice a purchase made today would be billed in.
    pub fn current_invoice(
        store: &dyn BillingStore,
        card_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<InvoiceWindow> {
        let card = store.card(card_id)?;
        let today = clock.today();
        billing::resolve_for_date(&card, today, today)
    }

    pub fn available_limit(
        store: &dyn BillingStore,
        card_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Decimal> {
        let card = store.card(card_id)?;
        let records = store.card_installments(card_id)?;
        billing::available_limit(&card, &records, clock.today())
    }
}
