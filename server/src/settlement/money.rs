//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done on `Decimal` internally, converted to `f64` only
//! at the storage/serialization edge. Two decimal places, half-up.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert an f64 price into a Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert a Decimal back to f64 for storage
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Round to 2 decimal places, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total for one cart line
pub fn line_total(unit_price: f64, quantity: i64) -> Decimal {
    round_money(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Total across (unit_price, quantity) pairs
pub fn cart_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (f64, i64)>,
{
    let sum = lines
        .into_iter()
        .map(|(price, qty)| line_total(price, qty))
        .sum::<Decimal>();
    round_money(sum)
}

/// Convert a major-unit amount to minor units (paise) for the gateway
pub fn to_minor_units(amount: Decimal) -> i64 {
    (round_money(amount) * Decimal::from(100))
        .to_i64()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn decimal_addition_avoids_float_drift() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum), 0.3);
    }

    #[test]
    fn line_totals_multiply_exactly() {
        assert_eq!(line_total(19.99, 3), Decimal::from_str("59.97").unwrap());
        assert_eq!(line_total(0.35, 10), Decimal::from_str("3.50").unwrap());
    }

    #[test]
    fn cart_total_sums_lines() {
        let total = cart_total(vec![(19.99, 3), (0.35, 10)]);
        assert_eq!(total, Decimal::from_str("63.47").unwrap());
    }

    #[test]
    fn minor_units_for_gateway() {
        assert_eq!(to_minor_units(Decimal::from_str("63.47").unwrap()), 6347);
        assert_eq!(to_minor_units(Decimal::from(250)), 25000);
    }
}
