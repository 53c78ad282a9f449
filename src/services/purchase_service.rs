use tracing::{info, warn};
use uuid::Uuid;

use super::store::BillingStore;
use crate::config::Config;
use crate::errors::{BillingError, Result};
use crate::installments::{schedule, InstallmentRecord, Purchase};

pub struct PurchaseService;

impl PurchaseService {
    /// Expands the purchase into installments and hands them to the store.
    pub fn register(
        store: &mut dyn BillingStore,
        card_id: Uuid,
        purchase: &Purchase,
        config: &Config,
    ) -> Result<Vec<InstallmentRecord>> {
        if purchase.installment_count > config.max_installments {
            warn!(
                count = purchase.installment_count,
                max = config.max_installments,
                "purchase exceeds installment cap"
            );
            return Err(BillingError::InvalidArgument(format!(
                "at most {} installments are allowed, got {}",
                config.max_installments, purchase.installment_count
            )));
        }
        store.card(card_id)?;
        let records = schedule(purchase)?;
        store.save_installments(card_id, &records)?;
        info!(
            %card_id,
            description = %purchase.description,
            installments = records.len(),
            "registered card purchase"
        );
        Ok(records)
    }
}
