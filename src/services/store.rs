use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::billing::CardConfig;
use crate::errors::{BillingError, Result};
use crate::installments::InstallmentRecord;
use crate::recurring::RecurringExpenseDef;

/// Abstraction over the backend that owns cards, recurring definitions and installments.
pub trait BillingStore: Send + Sync {
    fn card(&self, id: Uuid) -> Result<CardConfig>;
    fn card_installments(&self, card_id: Uuid) -> Result<Vec<InstallmentRecord>>;
    /// Installments of every card dated within `[start, end]`.
    fn installments_between(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<InstallmentRecord>>;
    fn recurring_definitions(&self) -> Result<Vec<RecurringExpenseDef>>;
    fn save_installments(&mut self, card_id: Uuid, records: &[InstallmentRecord]) -> Result<()>;
}

/// In-process store, used by the CLI session and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    cards: HashMap<Uuid, CardConfig>,
    installments: HashMap<Uuid, Vec<InstallmentRecord>>,
    recurring: Vec<RecurringExpenseDef>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_card(&mut self, card: CardConfig) -> Result<Uuid> {
        card.validate()?;
        let id = Uuid::new_v4();
        self.cards.insert(id, card);
        Ok(id)
    }

    pub fn add_recurring(&mut self, definition: RecurringExpenseDef) -> Result<()> {
        definition.validate()?;
        self.recurring.push(definition);
        Ok(())
    }
}

impl BillingStore for MemoryStore {
    fn card(&self, id: Uuid) -> Result<CardConfig> {
        self.cards
            .get(&id)
            .cloned()
            .ok_or_else(|| BillingError::NotFound(format!("card {id}")))
    }

    fn card_installments(&self, card_id: Uuid) -> Result<Vec<InstallmentRecord>> {
        self.card(card_id)?;
        Ok(self.installments.get(&card_id).cloned().unwrap_or_default())
    }

    fn installments_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InstallmentRecord>> {
        Ok(self
            .installments
            .values()
            .flatten()
            .filter(|record| record.date >= start && record.date <= end)
            .cloned()
            .collect())
    }

    fn recurring_definitions(&self) -> Result<Vec<RecurringExpenseDef>> {
        Ok(self.recurring.clone())
    }

    fn save_installments(&mut self, card_id: Uuid, records: &[InstallmentRecord]) -> Result<()> {
        self.card(card_id)?;
        self.installments
            .entry(card_id)
            .or_default()
            .extend_from_slice(records);
        Ok(())
    }
}
