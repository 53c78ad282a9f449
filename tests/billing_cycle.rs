mod common;

use billing_core::{
    billing::{resolve, resolve_for_date, CardConfig, InvoiceStatus},
    calendar::{advance, TimeUnit},
    installments::{schedule, Purchase},
    money::split,
};
use common::date;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn march_invoice_for_card_closing_on_the_tenth() {
    let card = CardConfig::new(10, 15, dec!(1000)).unwrap();
    let window = resolve(&card, 3, 2025, date(2025, 3, 20)).unwrap();

    assert_eq!(window.closing_date(), date(2025, 3, 10));
    assert_eq!(window.due_date, date(2025, 3, 15));
    assert_eq!(window.start_date, date(2025, 2, 11));
    assert_eq!(window.status, InvoiceStatus::Closed);
}

#[test]
fn month_end_clamp_in_non_leap_year() {
    assert_eq!(
        advance(date(2025, 1, 31), 1, TimeUnit::Month).unwrap(),
        date(2025, 2, 28)
    );
}

#[test]
fn consecutive_invoices_cover_every_day_once() {
    for (closing_day, due_day) in [(10, 15), (25, 5), (31, 10), (30, 30), (1, 28)] {
        let card = CardConfig::new(closing_day, due_day, dec!(0)).unwrap();
        let today = date(2025, 1, 1);
        let mut previous = resolve(&card, 1, 2025, today).unwrap();
        for month in 2..=12 {
            let window = resolve(&card, month, 2025, today).unwrap();
            assert_eq!(
                previous.end_date.succ_opt().unwrap(),
                window.start_date,
                "gap or overlap for card {closing_day}/{due_day} in month {month}"
            );
            previous = window;
        }
    }
}

#[test]
fn every_installment_lands_in_a_distinct_invoice() {
    let card = CardConfig::new(25, 5, dec!(10000)).unwrap();
    let purchase = Purchase::new("Geladeira", dec!(3999.90), date(2025, 1, 28), 10, "Casa").unwrap();
    let records = schedule(&purchase).unwrap();

    let today = date(2025, 1, 28);
    let mut due_dates: Vec<_> = records
        .iter()
        .map(|record| resolve_for_date(&card, record.date, today).unwrap().due_date)
        .collect();
    assert_eq!(due_dates[0], date(2025, 3, 5));
    due_dates.dedup();
    assert_eq!(due_dates.len(), 10);

    let total: Decimal = records.iter().map(|record| record.value).sum();
    assert_eq!(total, dec!(3999.90));
}

#[test]
fn split_matches_documented_examples() {
    assert_eq!(
        split(dec!(100), 3).unwrap(),
        vec![dec!(33.33), dec!(33.33), dec!(33.34)]
    );
    assert_eq!(
        split(dec!(300), 3).unwrap(),
        vec![dec!(100.00), dec!(100.00), dec!(100.00)]
    );
}
