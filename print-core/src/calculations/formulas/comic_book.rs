//! Quantity-interpolated lookup used by the comic book calculator.
//!
//! The breakpoint table for the chosen binding gives the order cost for the
//! reference page count. Other page counts scale it proportionally. The paper
//! upgrade and binding cost are flat per order. The total is rounded to a
//! whole currency unit.

use rust_decimal::Decimal;

use crate::calculations::CalculationError;
use crate::calculations::common::{add, div_quantity, mul, round_half_up, round_whole};
use crate::models::{ComicBookSelection, OptionCost, PriceBreakdown, Widget};
use crate::tables::{ComicBookRates, surcharge};

pub struct ComicBookFormula<'a> {
    rates: &'a ComicBookRates,
}

impl<'a> ComicBookFormula<'a> {
    pub fn new(rates: &'a ComicBookRates) -> Self {
        Self { rates }
    }

    pub fn calculate(
        &self,
        selection: &ComicBookSelection,
    ) -> Result<PriceBreakdown, CalculationError> {
        let quantity = selection.quantity.max(1);
        let base_price = self.base_cost(selection, quantity)?;

        let paper = surcharge(&self.rates.paper_upgrade, &selection.paper);
        let binding = surcharge(&self.rates.binding_cost, &selection.binding);

        let total = round_whole(add(add(base_price, paper)?, binding)?);

        Ok(PriceBreakdown {
            variant: Widget::ComicBook,
            quantity,
            base_price,
            option_costs: vec![
                OptionCost::new("paper", paper),
                OptionCost::new("binding", binding),
            ],
            subtotal: total,
            discount_fraction: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total,
            unit_price: round_half_up(div_quantity(total, quantity)?),
            estimated_weight_kg: None,
            delivery: None,
        })
    }

    fn base_cost(
        &self,
        selection: &ComicBookSelection,
        quantity: u32,
    ) -> Result<Decimal, CalculationError> {
        let table = self.rates.table_for(selection.binding)?;
        let cost = table.interpolate_price_with(quantity, self.rates.extrapolation_factor)?;

        let reference = self.rates.reference_pages.max(1);
        if selection.page_count == reference {
            return Ok(cost);
        }

        let scale = Decimal::from(selection.page_count)
            .checked_div(Decimal::from(reference))
            .ok_or(CalculationError::Overflow("division"))?;
        mul(cost, scale)
    }
}
