//! Forecast queries that read their inputs from the store.

use super::store::BillingStore;
use crate::clock::Clock;
use crate::errors::Result;
use crate::forecast::{build_forecast, ForecastItem, ForecastWindow};

pub struct ForecastService;

impl ForecastService {
    pub fn window(store: &dyn BillingStore, window: ForecastWindow) -> Result<Vec<ForecastItem>> {
        // the two reads are independent of each other
        let installments = store.installments_between(window.start, window.end)?;
        let definitions = store.recurring_definitions()?;
        build_forecast(&definitions, &installments, window)
    }

    /// Forecast from today through `months` months ahead.
    pub fn horizon(
        store: &dyn BillingStore,
        clock: &dyn Clock,
        months: u32,
    ) -> Result<Vec<ForecastItem>> {
        let window = ForecastWindow::months_ahead(clock.today(), months)?;
        Self::window(store, window)
    }
}
