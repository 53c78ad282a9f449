#![allow(dead_code)]

use billing_core::{
    billing::CardConfig,
    clock::FixedClock,
    services::MemoryStore,
};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn clock(year: i32, month: u32, day: u32) -> FixedClock {
    FixedClock::new(date(year, month, day))
}

/// Store holding one card that closes on the 10th and is due on the 15th.
pub fn store_with_card() -> (MemoryStore, Uuid) {
    let mut store = MemoryStore::new();
    let card = CardConfig::new(10, 15, dec!(3000)).expect("valid card");
    let card_id = store.add_card(card).expect("add card");
    (store, card_id)
}
