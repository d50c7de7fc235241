//! Exact-decimal price computation.
//!
//! All monetary arithmetic goes through [`rust_decimal::Decimal`] so cent
//! amounts never drift the way binary floats do. Every returned figure is
//! rounded to 2 decimal places with half-up rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Default sales tax rate applied to food orders (8%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Computed totals for a set of priced lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Sum of `unit_price * quantity` over all lines.
    pub subtotal: Decimal,
    /// `subtotal * tax_rate`, rounded independently of the total.
    pub tax: Decimal,
    /// `subtotal + tax`.
    pub total: Decimal,
}

impl Totals {
    /// Totals for an empty set of lines.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// Compute subtotal, tax, and total for `(unit_price, quantity)` lines.
///
/// The subtotal is rounded to 2 decimal places first, tax is computed from the
/// rounded subtotal and rounded independently, and the total is the sum of the
/// two. Pure and deterministic; callers resolve prices before calling in.
#[must_use]
pub fn compute_totals<I>(lines: I, tax_rate: Decimal) -> Totals
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    let raw: Decimal = lines
        .into_iter()
        .map(|(unit_price, quantity)| unit_price * Decimal::from(quantity))
        .sum();

    let subtotal = round_money(raw);
    let tax = round_money(subtotal * tax_rate);
    let total = round_money(subtotal + tax);

    Totals {
        subtotal,
        tax,
        total,
    }
}

/// Round to 2 decimal places, half-up.
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_tax_rate_is_8_percent() {
        assert_eq!(DEFAULT_TAX_RATE, dec("0.08"));
    }

    #[test]
    fn test_empty_lines() {
        let totals = compute_totals(std::iter::empty(), DEFAULT_TAX_RATE);
        assert_eq!(totals, Totals::zero());
    }

    #[test]
    fn test_known_scenario() {
        // 12.99 x 2 + 9.99 x 1 at 8% tax: tax 2.8776 rounds half-up to 2.88
        let totals = compute_totals(
            [(dec("12.99"), 2), (dec("9.99"), 1)],
            DEFAULT_TAX_RATE,
        );
        assert_eq!(totals.subtotal, dec("35.97"));
        assert_eq!(totals.tax, dec("2.88"));
        assert_eq!(totals.total, dec("38.85"));
    }

    #[test]
    fn test_total_is_subtotal_plus_tax() {
        let cases = [
            vec![(dec("0.01"), 1)],
            vec![(dec("19.99"), 3), (dec("4.50"), 7)],
            vec![(dec("100.00"), 1), (dec("0.99"), 99)],
        ];
        for lines in cases {
            let totals = compute_totals(lines, DEFAULT_TAX_RATE);
            assert_eq!(totals.total, totals.subtotal + totals.tax);
        }
    }

    #[test]
    fn test_no_drift_for_two_decimal_inputs() {
        // 2-decimal-exact prices: subtotal must be the exact sum, no rounding
        let totals = compute_totals([(dec("3.33"), 3), (dec("1.11"), 2)], DEFAULT_TAX_RATE);
        assert_eq!(totals.subtotal, dec("12.21"));
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // subtotal 6.25 -> tax 0.50 exactly; subtotal 1.69 -> tax 0.1352 -> 0.14
        let totals = compute_totals([(dec("1.69"), 1)], DEFAULT_TAX_RATE);
        assert_eq!(totals.tax, dec("0.14"));

        // midpoint case: subtotal 0.625 at 100% would be contrived; check the
        // half-up rule directly on the tax product 1.875 -> 1.88
        let totals = compute_totals([(dec("18.75"), 1)], dec("0.10"));
        assert_eq!(totals.tax, dec("1.88"));
    }

    #[test]
    fn test_zero_tax_rate() {
        let totals = compute_totals([(dec("5.00"), 2)], Decimal::ZERO);
        assert_eq!(totals.subtotal, dec("10.00"));
        assert_eq!(totals.tax, dec("0.00"));
        assert_eq!(totals.total, dec("10.00"));
    }
}
