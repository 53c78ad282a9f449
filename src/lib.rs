#![doc(test(attr(deny(warnings))))]

//! Billing Core computes credit-card invoice windows, splits purchases into exact installments
//! and projects recurring expenses into a dated forecast.

pub mod billing;
pub mod calendar;
pub mod cli;
pub mod clock;
pub mod config;
pub mod errors;
pub mod forecast;
pub mod installments;
pub mod money;
pub mod recurring;
pub mod services;
pub mod utils;

pub use errors::{BillingError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Billing Core tracing initialized.");
    });
}
