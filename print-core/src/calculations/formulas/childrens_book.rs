//! Additive flat rate per unit used by the children's book calculator.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Base: flat cost by book type × trim size multiplier |
//! | 2    | Pages: `ceil(pages / 4) × 0.8` |
//! | 3    | Options: cover, lamination and board thickness surcharges |
//! | 4    | Unit price: step 1 + step 2 + step 3 |
//! | 5    | Subtotal: unit price × quantity |
//! | 6    | Discount: subtotal × tier fraction for the quantity |
//! | 7    | Total: subtotal − discount |
//!
//! The estimated shipping weight is `pages × quantity × 0.1 / 100` kg,
//! rounded to one decimal place.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use print_core::calculations::{ChildrensBookFormula, DiscountTierTable};
//! use print_core::models::ChildrensBookSelection;
//! use print_core::tables::ChildrensBookRates;
//!
//! let rates = ChildrensBookRates::default();
//! let tiers = DiscountTierTable::default();
//! let formula = ChildrensBookFormula::new(&rates, &tiers);
//!
//! let result = formula.calculate(&ChildrensBookSelection::default()).unwrap();
//!
//! assert_eq!(result.unit_price, dec!(34.8));
//! assert_eq!(result.total, dec!(3480));
//! ```

use rust_decimal::Decimal;

use crate::calculations::CalculationError;
use crate::calculations::common::{add, mul, round_to};
use crate::calculations::discount::DiscountTierTable;
use crate::models::{ChildrensBookSelection, OptionCost, PriceBreakdown, Widget};
use crate::tables::{ChildrensBookRates, surcharge};

pub struct ChildrensBookFormula<'a> {
    rates: &'a ChildrensBookRates,
    discounts: &'a DiscountTierTable,
}

impl<'a> ChildrensBookFormula<'a> {
    pub fn new(
        rates: &'a ChildrensBookRates,
        discounts: &'a DiscountTierTable,
    ) -> Self {
        Self { rates, discounts }
    }

    pub fn calculate(
        &self,
        selection: &ChildrensBookSelection,
    ) -> Result<PriceBreakdown, CalculationError> {
        let quantity = selection.quantity.max(1);

        // Steps 1-3
        let base_price = self.base_price(selection)?;
        let option_costs = self.option_costs(selection)?;
        let options_total = option_costs
            .iter()
            .try_fold(Decimal::ZERO, |acc, c| add(acc, c.amount))?;

        // Steps 4-5
        let unit_price = add(base_price, options_total)?;
        let subtotal = mul(unit_price, Decimal::from(quantity))?;

        // Steps 6-7
        let discount_fraction = self.discounts.discount_for(quantity);
        let discount_amount = mul(subtotal, discount_fraction)?;
        let total = subtotal - discount_amount;

        Ok(PriceBreakdown {
            variant: Widget::ChildrensBook,
            quantity,
            base_price,
            option_costs,
            subtotal,
            discount_fraction,
            discount_amount,
            total,
            unit_price,
            estimated_weight_kg: Some(self.estimated_weight(selection.page_count, quantity)?),
            delivery: None,
        })
    }

    fn base_price(
        &self,
        selection: &ChildrensBookSelection,
    ) -> Result<Decimal, CalculationError> {
        mul(
            self.rates.book_base_for(selection.book_type),
            self.rates.size_multiplier_for(selection.trim_size),
        )
    }

    fn page_cost(
        &self,
        page_count: u32,
    ) -> Result<Decimal, CalculationError> {
        let steps = page_count.div_ceil(self.rates.pages_per_step.max(1));
        mul(Decimal::from(steps), self.rates.page_step_rate)
    }

    fn option_costs(
        &self,
        selection: &ChildrensBookSelection,
    ) -> Result<Vec<OptionCost>, CalculationError> {
        Ok(vec![
            OptionCost::new("pages", self.page_cost(selection.page_count)?),
            OptionCost::new(
                "cover",
                surcharge(&self.rates.cover_surcharge, &selection.cover),
            ),
            OptionCost::new(
                "lamination",
                surcharge(&self.rates.lamination_surcharge, &selection.lamination),
            ),
            OptionCost::new(
                "thickness",
                surcharge(&self.rates.thickness_surcharge, &selection.thickness),
            ),
        ])
    }

    fn estimated_weight(
        &self,
        page_count: u32,
        quantity: u32,
    ) -> Result<Decimal, CalculationError> {
        let sheets = mul(Decimal::from(page_count), Decimal::from(quantity))?;
        let grams = mul(sheets, Decimal::new(1, 1))?;
        Ok(round_to(grams / Decimal::ONE_HUNDRED, 1))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{BoardThickness, BookType, CoverStock, Lamination, TrimSize};

    fn calculate(selection: &ChildrensBookSelection) -> PriceBreakdown {
        let rates = ChildrensBookRates::default();
        let tiers = DiscountTierTable::default();
        ChildrensBookFormula::new(&rates, &tiers)
            .calculate(selection)
            .unwrap()
    }

    // =========================================================================
    // flat rate tests
    // =========================================================================

    #[test]
    fn default_hardcover_at_one_hundred() {
        let result = calculate(&ChildrensBookSelection::default());

        assert_eq!(result.base_price, dec!(30));
        assert_eq!(result.option_cost("pages"), Some(dec!(4.8)));
        assert_eq!(result.options_total(), dec!(4.8));
        assert_eq!(result.unit_price, dec!(34.8));
        assert_eq!(result.subtotal, dec!(3480));
        assert_eq!(result.discount_fraction, dec!(0));
        assert_eq!(result.total, dec!(3480));
    }

    #[test]
    fn five_hundred_copies_get_ten_percent() {
        let selection = ChildrensBookSelection {
            quantity: 500,
            ..ChildrensBookSelection::default()
        };

        let result = calculate(&selection);

        assert_eq!(result.subtotal, dec!(17400));
        assert_eq!(result.discount_fraction, dec!(0.10));
        assert_eq!(result.discount_amount, dec!(1740));
        assert_eq!(result.total, dec!(15660));
    }

    #[test]
    fn surcharges_add_per_unit() {
        let selection = ChildrensBookSelection {
            book_type: BookType::Softcover,
            trim_size: TrimSize::SixByNine,
            cover: CoverStock::Leather,
            lamination: Lamination::Soft,
            thickness: BoardThickness::ThreeMm,
            page_count: 32,
            quantity: 10,
            ..ChildrensBookSelection::default()
        };

        let result = calculate(&selection);

        // 12 + 8 × 0.8 + 8 + 2 + 2
        assert_eq!(result.unit_price, dec!(30.4));
        assert_eq!(result.total, dec!(304));
    }

    #[test]
    fn partial_page_step_rounds_up() {
        let selection = ChildrensBookSelection {
            page_count: 25,
            ..ChildrensBookSelection::default()
        };

        let result = calculate(&selection);

        // ceil(25 / 4) = 7
        assert_eq!(result.option_cost("pages"), Some(dec!(5.6)));
    }

    #[test]
    fn missing_book_type_uses_fallback_base() {
        let mut rates = ChildrensBookRates::default();
        rates.book_base.remove(&BookType::Board);
        let tiers = DiscountTierTable::default();
        let selection = ChildrensBookSelection {
            book_type: BookType::Board,
            trim_size: TrimSize::SixByNine,
            ..ChildrensBookSelection::default()
        };

        let result = ChildrensBookFormula::new(&rates, &tiers)
            .calculate(&selection)
            .unwrap();

        assert_eq!(result.base_price, dec!(15));
    }

    // =========================================================================
    // weight and invariant tests
    // =========================================================================

    #[test]
    fn weight_is_rounded_to_one_decimal() {
        let result = calculate(&ChildrensBookSelection::default());

        // 24 × 100 × 0.1 / 100
        assert_eq!(result.estimated_weight_kg, Some(dec!(2.4)));
    }

    #[test]
    fn weight_rounds_half_away_from_zero() {
        let selection = ChildrensBookSelection {
            page_count: 25,
            quantity: 2,
            ..ChildrensBookSelection::default()
        };

        let result = calculate(&selection);

        // 25 × 2 × 0.1 / 100 = 0.05
        assert_eq!(result.estimated_weight_kg, Some(dec!(0.1)));
    }

    #[test]
    fn total_is_subtotal_minus_discount() {
        for quantity in [1, 99, 100, 250, 999, 1000, 2500, 5000, 10_000] {
            let selection = ChildrensBookSelection {
                quantity,
                ..ChildrensBookSelection::default()
            };

            let result = calculate(&selection);

            assert_eq!(result.total, result.subtotal - result.discount_amount);
            assert_eq!(
                result.discount_amount,
                result.subtotal * result.discount_fraction
            );
        }
    }
}
