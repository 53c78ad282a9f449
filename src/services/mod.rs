//! Persistence-facing wrappers around the pure billing and forecast functions.

pub mod card_service;
pub mod forecast_service;
pub mod purchase_service;
pub mod store;

pub use card_service::CardService;
pub use forecast_service::ForecastService;
pub use purchase_service::PurchaseService;
pub use store::{BillingStore, MemoryStore};
