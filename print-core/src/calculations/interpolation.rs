//! Quantity-interpolated price lookup.
//!
//! Print cost is not linear in quantity because setup cost is amortized over
//! the run. A [`BreakpointTable`] holds a few calibrated (quantity, price)
//! points. Prices in between are interpolated linearly. Orders beyond the
//! top breakpoint are extrapolated with a flat volume discount.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CalculationError;
use super::common::{add, mul};

/// Multiplier applied when extrapolating past the largest breakpoint.
pub const VOLUME_EXTRAPOLATION_FACTOR: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Sparse map from order quantity to absolute order cost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakpointTable {
    points: BTreeMap<u32, Decimal>,
}

impl BreakpointTable {
    pub fn new(points: BTreeMap<u32, Decimal>) -> Self {
        Self { points }
    }

    pub fn insert(
        &mut self,
        quantity: u32,
        price: Decimal,
    ) {
        self.points.insert(quantity, price);
    }

    pub fn get(
        &self,
        quantity: u32,
    ) -> Option<Decimal> {
        self.points.get(&quantity).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Breakpoints in ascending quantity order.
    pub fn points(&self) -> impl Iterator<Item = (u32, Decimal)> + '_ {
        self.points.iter().map(|(q, p)| (*q, *p))
    }

    /// Prices an order of `quantity` units with the default extrapolation factor.
    ///
    /// * At or below the smallest breakpoint: that breakpoint's price.
    /// * At or above the largest breakpoint: `price[max] × (quantity / max) × 0.9`.
    /// * Exactly on any other breakpoint: that breakpoint's price.
    /// * Otherwise: linear interpolation between the two bracketing points.
    ///
    /// # Errors
    ///
    /// [`CalculationError::EmptyPriceTable`] when the table has no points.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use rust_decimal_macros::dec;
    /// use print_core::calculations::BreakpointTable;
    ///
    /// let table = BreakpointTable::new(BTreeMap::from([(50, dec!(220)), (100, dec!(285))]));
    ///
    /// assert_eq!(table.interpolate_price(75).unwrap(), dec!(252.5));
    /// ```
    pub fn interpolate_price(
        &self,
        quantity: u32,
    ) -> Result<Decimal, CalculationError> {
        self.interpolate_price_with(quantity, VOLUME_EXTRAPOLATION_FACTOR)
    }

    /// Same as [`interpolate_price`](Self::interpolate_price) with an explicit
    /// extrapolation factor.
    pub fn interpolate_price_with(
        &self,
        quantity: u32,
        extrapolation_factor: Decimal,
    ) -> Result<Decimal, CalculationError> {
        let (&min_qty, &min_price) = self
            .points
            .first_key_value()
            .ok_or(CalculationError::EmptyPriceTable)?;
        let (&max_qty, &max_price) = self
            .points
            .last_key_value()
            .ok_or(CalculationError::EmptyPriceTable)?;

        if quantity <= min_qty {
            return Ok(min_price);
        }

        // The top breakpoint itself already takes the volume discount.
        if quantity >= max_qty {
            let scale = Decimal::from(quantity)
                .checked_div(Decimal::from(max_qty.max(1)))
                .ok_or(CalculationError::Overflow("division"))?;
            return mul(mul(max_price, scale)?, extrapolation_factor);
        }

        if let Some(&exact) = self.points.get(&quantity) {
            return Ok(exact);
        }

        // min_qty < quantity < max_qty and not a breakpoint, so both
        // neighbours exist and differ.
        let (&lower_qty, &lower_price) = self
            .points
            .range(..=quantity)
            .next_back()
            .ok_or(CalculationError::EmptyPriceTable)?;
        let (&upper_qty, &upper_price) = self
            .points
            .range(quantity..)
            .next()
            .ok_or(CalculationError::EmptyPriceTable)?;

        let ratio = Decimal::from(quantity - lower_qty)
            .checked_div(Decimal::from(upper_qty - lower_qty))
            .ok_or(CalculationError::Overflow("division"))?;

        add(lower_price, mul(upper_price - lower_price, ratio)?)
    }
}

impl FromIterator<(u32, Decimal)> for BreakpointTable {
    fn from_iter<I: IntoIterator<Item = (u32, Decimal)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn saddle_table() -> BreakpointTable {
        BreakpointTable::new(BTreeMap::from([
            (25, dec!(180)),
            (50, dec!(220)),
            (100, dec!(285)),
            (250, dec!(580)),
            (500, dec!(980)),
        ]))
    }

    #[test]
    fn extrapolation_factor_is_ninety_percent() {
        assert_eq!(VOLUME_EXTRAPOLATION_FACTOR, dec!(0.9));
    }

    // =========================================================================
    // boundary tests
    // =========================================================================

    #[test]
    fn interior_breakpoints_return_table_values() {
        let table = saddle_table();

        for (quantity, price) in table.points().filter(|(q, _)| *q < 500).collect::<Vec<_>>() {
            assert_eq!(table.interpolate_price(quantity), Ok(price));
        }
    }

    #[test]
    fn top_breakpoint_takes_volume_discount() {
        let table = saddle_table();

        // 980 × (500 / 500) × 0.9
        assert_eq!(table.interpolate_price(500), Ok(dec!(882)));
    }

    #[test]
    fn just_past_top_breakpoint_extrapolates() {
        let table = saddle_table();

        // 980 × (501 / 500) × 0.9 = 882.1764
        assert_eq!(table.interpolate_price(501), Ok(dec!(882.1764)));
    }

    #[test]
    fn below_smallest_breakpoint_clamps() {
        let table = saddle_table();

        assert_eq!(table.interpolate_price(1), Ok(dec!(180)));
        assert_eq!(table.interpolate_price(0), Ok(dec!(180)));
    }

    // =========================================================================
    // interpolation tests
    // =========================================================================

    #[test]
    fn midpoint_between_breakpoints() {
        let table = saddle_table();

        // 220 + (285 - 220) × 0.5
        assert_eq!(table.interpolate_price(75), Ok(dec!(252.5)));
    }

    #[test]
    fn interpolation_is_linear_within_segment() {
        let table = saddle_table();

        // 285 + (580 - 285) × (160 - 100) / 150 = 285 + 118
        assert_eq!(table.interpolate_price(160), Ok(dec!(403)));
    }

    // =========================================================================
    // extrapolation tests
    // =========================================================================

    #[test]
    fn beyond_largest_breakpoint_scales_with_discount() {
        let table = saddle_table();

        // 980 × (1000 / 500) × 0.9 = 1764
        assert_eq!(table.interpolate_price(1000), Ok(dec!(1764)));
    }

    #[test]
    fn extrapolation_honours_custom_factor() {
        let table = saddle_table();

        assert_eq!(table.interpolate_price_with(1000, dec!(1)), Ok(dec!(1960)));
    }

    // =========================================================================
    // error tests
    // =========================================================================

    #[test]
    fn empty_table_is_an_error() {
        let table = BreakpointTable::default();

        assert_eq!(
            table.interpolate_price(100),
            Err(CalculationError::EmptyPriceTable)
        );
    }

    #[test]
    fn single_point_table_clamps_then_extrapolates() {
        let table: BreakpointTable = [(100, dec!(300))].into_iter().collect();

        assert_eq!(table.interpolate_price(50), Ok(dec!(300)));
        assert_eq!(table.interpolate_price(200), Ok(dec!(540)));
    }
}
