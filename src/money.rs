//! Monetary arithmetic on minor currency units (paise).
//!
//! Line totals and subtotals are exact integer math; only the tax-rate
//! multiplication needs fractions, which goes through `rust_decimal` and is
//! rounded half-up back to minor units. One configured rate applies to every
//! order regardless of where it was placed.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}

/// Compute order totals from (unit_price, quantity) pairs and a tax rate in
/// basis points.
pub fn compute_totals(lines: &[(i64, i32)], tax_rate_bps: i32) -> Totals {
    let subtotal: i64 = lines
        .iter()
        .map(|(price, qty)| line_total(*price, *qty))
        .sum();
    let tax = tax_amount(subtotal, tax_rate_bps);
    Totals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

pub fn line_total(unit_price: i64, quantity: i32) -> i64 {
    unit_price * quantity as i64
}

/// subtotal * rate, rounded half-up to whole minor units.
pub fn tax_amount(subtotal: i64, tax_rate_bps: i32) -> i64 {
    let rate = Decimal::new(tax_rate_bps as i64, 4);
    let tax = Decimal::from(subtotal) * rate;
    tax.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Render minor units as a decimal string, e.g. 29500 -> "295.00".
pub fn format_minor(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_cart_at_eighteen_percent() {
        // [{price 100.00, qty 2}, {price 50.00, qty 1}] at 18%
        let totals = compute_totals(&[(10_000, 2), (5_000, 1)], 1800);
        assert_eq!(totals.subtotal, 25_000);
        assert_eq!(totals.tax, 4_500);
        assert_eq!(totals.total, 29_500);
    }

    #[test]
    fn tax_rounds_half_up() {
        // 1.01 at 5% = 0.0505 -> 0.05
        assert_eq!(tax_amount(101, 500), 5);
        // 0.10 at 5% = 0.005 -> 0.01
        assert_eq!(tax_amount(10, 500), 1);
    }

    #[test]
    fn zero_rate_means_zero_tax() {
        let totals = compute_totals(&[(9_999, 3)], 0);
        assert_eq!(totals.tax, 0);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn formats_minor_units() {
        assert_eq!(format_minor(29_500), "295.00");
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(-150), "-1.50");
    }
}
