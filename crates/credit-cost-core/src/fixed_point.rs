//! Decimal arithmetic at a fixed fractional scale.
//!
//! Every intermediate quantity of a payment plan (periodic rate, periodic
//! interest, free-period interest) is held at nine fractional digits and
//! rounded half-up. Nine is the smallest scale that keeps the cumulative error
//! of a 360+ period plan under one cent against spreadsheet reference values.
//! Currency-facing outputs are rounded to two digits with the same rule.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

use crate::error::CreditCostError;
use crate::CreditCostResult;

/// Fractional digits kept by every scaled operation.
pub const SCALE: u32 = 9;

/// Fractional digits of currency-facing outputs.
pub const CURRENCY_SCALE: u32 = 2;

/// Round half-up (away from zero on a tie) to `dp` fractional digits.
pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the fixed scale.
pub fn scaled(value: Decimal) -> Decimal {
    round_to(value, SCALE)
}

/// Round to whole cents.
pub fn round_currency(value: Decimal) -> Decimal {
    round_to(value, CURRENCY_SCALE)
}

pub fn add(a: Decimal, b: Decimal) -> Decimal {
    scaled(a + b)
}

pub fn sub(a: Decimal, b: Decimal) -> Decimal {
    scaled(a - b)
}

pub fn mul(a: Decimal, b: Decimal) -> Decimal {
    scaled(a * b)
}

/// Scaled division. A zero divisor is reported rather than guarded.
pub fn div(numerator: Decimal, denominator: Decimal) -> CreditCostResult<Decimal> {
    numerator
        .checked_div(denominator)
        .map(scaled)
        .ok_or_else(|| CreditCostError::DivisionByZero {
            context: format!("scaled division {numerator} / {denominator}"),
        })
}

/// Integer power, unscaled. Negative exponents divide.
///
/// The result keeps the full 28-digit precision of `Decimal` so callers can
/// decide where the single rounding step happens.
pub fn pow(base: Decimal, exponent: i64) -> CreditCostResult<Decimal> {
    base.checked_powi(exponent)
        .ok_or_else(|| CreditCostError::Overflow {
            context: format!("{base}^{exponent}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate_rounds_half_up_at_nine_digits() {
        // 0.055 / 12 = 0.00458333...
        assert_eq!(div(dec!(0.055), dec!(12)).unwrap(), dec!(0.004583333));
        // 0.0677 / 12 = 0.005641666...
        assert_eq!(div(dec!(0.0677), dec!(12)).unwrap(), dec!(0.005641667));
    }

    #[test]
    fn test_tie_rounds_away_from_zero() {
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(-2.345)), dec!(-2.35));
        assert_eq!(scaled(dec!(0.0000000005)), dec!(0.000000001));
    }

    #[test]
    fn test_add_sub_mul_keep_scale() {
        assert_eq!(add(dec!(0.1234567891), dec!(1)), dec!(1.123456789));
        assert_eq!(sub(dec!(1), dec!(0.0000000004)), dec!(1.000000000));
        assert_eq!(mul(dec!(49859.3), dec!(0.005641667)), dec!(281.289567453));
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let err = div(dec!(1), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, CreditCostError::DivisionByZero { .. }));
    }

    #[test]
    fn test_integer_power() {
        assert_eq!(pow(dec!(1.1), 2).unwrap(), dec!(1.21));
        assert_eq!(pow(dec!(2), -2).unwrap(), dec!(0.25));
        assert_eq!(pow(dec!(5), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_power_overflow_is_an_error() {
        let err = pow(dec!(1000), 20).unwrap_err();
        assert!(matches!(err, CreditCostError::Overflow { .. }));
    }
}
