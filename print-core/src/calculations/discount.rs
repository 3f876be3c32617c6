//! Quantity discount tiers.
//!
//! A [`DiscountTierTable`] maps minimum order quantities to discount
//! fractions. The discount for an order is the fraction of the largest
//! threshold that does not exceed the quantity, so the discount is a
//! right-continuous staircase in quantity.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a tier table is rejected at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountTierError {
    /// A fraction outside `[0, 1)`.
    #[error("discount {fraction} at {threshold} units is outside [0, 1)")]
    FractionOutOfRange { threshold: u32, fraction: Decimal },

    /// A larger threshold carrying a smaller discount.
    #[error("discount drops from {previous} to {fraction} at {threshold} units")]
    NotMonotonic {
        threshold: u32,
        previous: Decimal,
        fraction: Decimal,
    },
}

/// Validated map from minimum quantity to discount fraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u32, Decimal>", into = "BTreeMap<u32, Decimal>")]
pub struct DiscountTierTable {
    tiers: BTreeMap<u32, Decimal>,
}

impl DiscountTierTable {
    /// Builds a table, checking that every fraction is in `[0, 1)` and that
    /// fractions never decrease as thresholds grow.
    pub fn new(tiers: BTreeMap<u32, Decimal>) -> Result<Self, DiscountTierError> {
        let mut previous = Decimal::ZERO;
        for (&threshold, &fraction) in &tiers {
            if fraction < Decimal::ZERO || fraction >= Decimal::ONE {
                return Err(DiscountTierError::FractionOutOfRange {
                    threshold,
                    fraction,
                });
            }
            if fraction < previous {
                return Err(DiscountTierError::NotMonotonic {
                    threshold,
                    previous,
                    fraction,
                });
            }
            previous = fraction;
        }
        Ok(Self { tiers })
    }

    /// A table with no tiers; every order gets zero discount.
    pub fn empty() -> Self {
        Self {
            tiers: BTreeMap::new(),
        }
    }

    /// Returns the discount fraction for `quantity`.
    ///
    /// Scans thresholds from the largest down and takes the first one that
    /// is `<= quantity`. Quantities below the smallest threshold get zero.
    pub fn discount_for(
        &self,
        quantity: u32,
    ) -> Decimal {
        self.tiers
            .range(..=quantity)
            .next_back()
            .map(|(_, fraction)| *fraction)
            .unwrap_or(Decimal::ZERO)
    }

    /// Thresholds and fractions in ascending threshold order.
    pub fn tiers(&self) -> impl Iterator<Item = (u32, Decimal)> + '_ {
        self.tiers.iter().map(|(q, f)| (*q, *f))
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl Default for DiscountTierTable {
    /// The storefront's volume tiers: 5% from 250 units up to 25% from 5000.
    fn default() -> Self {
        let tiers = BTreeMap::from([
            (100, Decimal::ZERO),
            (250, Decimal::new(5, 2)),
            (500, Decimal::new(10, 2)),
            (1000, Decimal::new(15, 2)),
            (2500, Decimal::new(20, 2)),
            (5000, Decimal::new(25, 2)),
        ]);
        Self { tiers }
    }
}

impl TryFrom<BTreeMap<u32, Decimal>> for DiscountTierTable {
    type Error = DiscountTierError;

    fn try_from(tiers: BTreeMap<u32, Decimal>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<DiscountTierTable> for BTreeMap<u32, Decimal> {
    fn from(table: DiscountTierTable) -> Self {
        table.tiers
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // discount_for tests
    // =========================================================================

    #[test]
    fn below_smallest_threshold_is_zero() {
        let table = DiscountTierTable::default();

        assert_eq!(table.discount_for(1), dec!(0));
        assert_eq!(table.discount_for(99), dec!(0));
    }

    #[test]
    fn exact_threshold_selects_that_tier() {
        let table = DiscountTierTable::default();

        assert_eq!(table.discount_for(250), dec!(0.05));
        assert_eq!(table.discount_for(500), dec!(0.10));
        assert_eq!(table.discount_for(5000), dec!(0.25));
    }

    #[test]
    fn between_thresholds_uses_lower_tier() {
        let table = DiscountTierTable::default();

        assert_eq!(table.discount_for(249), dec!(0));
        assert_eq!(table.discount_for(999), dec!(0.10));
        assert_eq!(table.discount_for(4999), dec!(0.20));
    }

    #[test]
    fn above_largest_threshold_uses_top_tier() {
        let table = DiscountTierTable::default();

        assert_eq!(table.discount_for(1_000_000), dec!(0.25));
    }

    #[test]
    fn discount_is_monotonic_in_quantity() {
        let table = DiscountTierTable::default();

        let mut previous = Decimal::ZERO;
        for quantity in 1..=6000 {
            let fraction = table.discount_for(quantity);
            assert!(
                fraction >= previous,
                "discount fell from {previous} to {fraction} at {quantity}"
            );
            previous = fraction;
        }
    }

    #[test]
    fn empty_table_never_discounts() {
        assert_eq!(DiscountTierTable::empty().discount_for(10_000), dec!(0));
    }

    // =========================================================================
    // construction tests
    // =========================================================================

    #[test]
    fn new_rejects_decreasing_fractions() {
        let tiers = BTreeMap::from([(100, dec!(0.10)), (500, dec!(0.05))]);

        let result = DiscountTierTable::new(tiers);

        assert_eq!(
            result,
            Err(DiscountTierError::NotMonotonic {
                threshold: 500,
                previous: dec!(0.10),
                fraction: dec!(0.05),
            })
        );
    }

    #[test]
    fn new_rejects_full_discount() {
        let tiers = BTreeMap::from([(100, dec!(1.0))]);

        let result = DiscountTierTable::new(tiers);

        assert!(matches!(
            result,
            Err(DiscountTierError::FractionOutOfRange { threshold: 100, .. })
        ));
    }

    #[test]
    fn deserialize_validates_tiers() {
        let ok: DiscountTierTable =
            serde_json::from_str(r#"{"10": "0.0", "20": "0.5"}"#).unwrap();
        assert_eq!(ok.discount_for(25), dec!(0.5));

        let bad = serde_json::from_str::<DiscountTierTable>(r#"{"10": "0.5", "20": "0.1"}"#);
        assert!(bad.is_err());
    }
}
