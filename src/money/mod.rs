//! Exact currency arithmetic on top of `rust_decimal`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::errors::{BillingError, Result};

/// Number of decimal places of the currency minor unit.
pub const CENT_SCALE: u32 = 2;

/// Rounds to the minor unit, half away from zero.
pub fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `true` when the value carries no fraction below one cent.
pub fn is_cent_precise(value: Decimal) -> bool {
    value.round_dp(CENT_SCALE) == value
}

/// Splits `total` into `count` amounts that add up to `total` exactly.
///
/// Every amount but the last is `round(total / count, 2)`; the last absorbs the rounding
/// remainder and may be zero or negative when the total is only a few cents. A single
/// installment returns the total unchanged.
pub fn split(total: Decimal, count: u32) -> Result<Vec<Decimal>> {
    if total <= Decimal::ZERO {
        warn!(%total, "refusing to split a non-positive amount");
        return Err(BillingError::InvalidArgument(format!(
            "amount must be positive, got {total}"
        )));
    }
    if count < 1 {
        warn!(count, "refusing to split into zero installments");
        return Err(BillingError::InvalidArgument(
            "installment count must be at least 1".into(),
        ));
    }
    if !is_cent_precise(total) {
        warn!(%total, "amount has sub-cent precision");
        return Err(BillingError::InvalidArgument(format!(
            "amount {total} has more than {CENT_SCALE} decimal places"
        )));
    }
    if count == 1 {
        return Ok(vec![total]);
    }

    let divisor = Decimal::from(count);
    let base = total
        .checked_div(divisor)
        .map(round_to_cents)
        .ok_or_else(|| BillingError::InvalidArgument(format!("cannot divide {total}")))?;
    let last = total - base * Decimal::from(count - 1);

    let mut values = vec![base; (count - 1) as usize];
    values.push(last);
    Ok(values)
}

/// Renders an amount with its currency code and exactly two decimals, e.g. `BRL 1234.50`.
pub fn format_amount(value: Decimal, currency: &str) -> String {
    let mut rounded = round_to_cents(value);
    rounded.rescale(CENT_SCALE);
    format!("{} {}", currency, rounded)
}

/// Parses user-supplied decimal text such as `"1234.56"`.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .map_err(|err| BillingError::InvalidArgument(format!("invalid amount `{trimmed}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn split_assigns_remainder_to_last_installment() {
        let parts = split(dec!(100), 3).unwrap();
        assert_eq!(parts, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
    }

    #[test]
    fn split_even_amounts_are_uniform() {
        let parts = split(dec!(300), 3).unwrap();
        assert_eq!(parts, vec![dec!(100.00), dec!(100.00), dec!(100.00)]);
    }

    #[test]
    fn split_single_installment_returns_total() {
        assert_eq!(split(dec!(59.90), 1).unwrap(), vec![dec!(59.90)]);
    }

    #[test]
    fn split_rounds_half_away_from_zero() {
        // 0.25 / 2 = 0.125 -> 0.13, last = 0.12
        let parts = split(dec!(0.25), 2).unwrap();
        assert_eq!(parts, vec![dec!(0.13), dec!(0.12)]);
    }

    #[test]
    fn split_sum_is_exact_for_many_totals() {
        let totals = [
            dec!(0.01),
            dec!(0.05),
            dec!(0.11),
            dec!(1.00),
            dec!(99.99),
            dec!(1234.57),
            dec!(10000),
        ];
        for total in totals {
            for count in 1..=48u32 {
                let parts = split(total, count).unwrap();
                assert_eq!(parts.len(), count as usize);
                assert_eq!(parts.iter().copied().sum::<Decimal>(), total);
                assert!(parts.iter().all(|part| is_cent_precise(*part)));
            }
        }
    }

    #[test]
    fn split_rejects_invalid_input() {
        assert!(matches!(
            split(dec!(0), 2),
            Err(BillingError::InvalidArgument(_))
        ));
        assert!(matches!(
            split(dec!(-5), 2),
            Err(BillingError::InvalidArgument(_))
        ));
        assert!(matches!(
            split(dec!(10), 0),
            Err(BillingError::InvalidArgument(_))
        ));
        assert!(matches!(
            split(dec!(10.005), 2),
            Err(BillingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn split_small_total_leaves_remainder_on_last_installment() {
        let parts = split(dec!(0.11), 7).unwrap();
        let mut expected = vec![dec!(0.02); 6];
        expected.push(dec!(-0.01));
        assert_eq!(parts, expected);

        let parts = split(dec!(0.05), 24).unwrap();
        assert_eq!(parts.len(), 24);
        assert!(parts[..23].iter().all(|part| part.is_zero()));
        assert_eq!(parts[23], dec!(0.05));
    }

    #[test]
    fn format_amount_pads_to_cents() {
        assert_eq!(format_amount(dec!(100), "BRL"), "BRL 100.00");
        assert_eq!(format_amount(dec!(33.335), "BRL"), "BRL 33.34");
    }

    #[test]
    fn parse_amount_reports_bad_input() {
        assert_eq!(parse_amount(" 12.50 ").unwrap(), dec!(12.50));
        assert!(parse_amount("twelve").is_err());
    }
}
