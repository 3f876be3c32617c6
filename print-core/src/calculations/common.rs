//! Common utility functions for price calculations.
//!
//! This module provides the rounding and overflow-checked arithmetic shared
//! by every formula variant.

use rust_decimal::{Decimal, RoundingStrategy};

use super::CalculationError;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use print_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(2.854)), dec!(2.85));
/// assert_eq!(round_half_up(dec!(2.855)), dec!(2.86));
/// assert_eq!(round_half_up(dec!(-2.855)), dec!(-2.86)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    round_to(value, 2)
}

/// Rounds to `dp` decimal places, midpoints away from zero.
pub fn round_to(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to a whole currency unit, midpoints away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use print_core::calculations::common::round_whole;
///
/// assert_eq!(round_whole(dec!(252.5)), dec!(253));
/// assert_eq!(round_whole(dec!(252.49)), dec!(252));
/// ```
pub fn round_whole(value: Decimal) -> Decimal {
    round_to(value, 0)
}

/// Multiplies, reporting overflow as a [`CalculationError`].
pub fn mul(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, CalculationError> {
    a.checked_mul(b)
        .ok_or(CalculationError::Overflow("multiplication"))
}

/// Adds, reporting overflow as a [`CalculationError`].
pub fn add(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, CalculationError> {
    a.checked_add(b).ok_or(CalculationError::Overflow("addition"))
}

/// Divides by a quantity that the caller guarantees is at least 1.
pub fn div_quantity(
    amount: Decimal,
    quantity: u32,
) -> Result<Decimal, CalculationError> {
    amount
        .checked_div(Decimal::from(quantity.max(1)))
        .ok_or(CalculationError::Overflow("division"))
}

/// Multiplies a base amount by every factor in turn.
pub fn product_of(
    base: Decimal,
    factors: &[Decimal],
) -> Result<Decimal, CalculationError> {
    factors.iter().try_fold(base, |acc, f| mul(acc, *f))
}
