//! Quick quote for a product gallery item.
//!
//! `total = round2(unit_price × material × finish × quantity)`

use rust_decimal::Decimal;

use crate::calculations::CalculationError;
use crate::calculations::common::{div_quantity, mul, round_half_up};
use crate::models::{OptionCost, PriceBreakdown, QuickQuoteSelection, Widget};
use crate::tables::{QuickQuoteRates, rate};

pub struct QuickQuoteFormula<'a> {
    rates: &'a QuickQuoteRates,
}

impl<'a> QuickQuoteFormula<'a> {
    pub fn new(rates: &'a QuickQuoteRates) -> Self {
        Self { rates }
    }

    pub fn calculate(
        &self,
        selection: &QuickQuoteSelection,
    ) -> Result<PriceBreakdown, CalculationError> {
        let quantity = selection.quantity.max(1);
        let material = rate("material", &self.rates.material, &selection.material)?;
        let finish = rate("finish", &self.rates.finish, &selection.finish)?;

        let base_price = mul(selection.unit_price, Decimal::from(quantity))?;
        let with_material = mul(base_price, material)?;
        let total = round_half_up(mul(with_material, finish)?);

        // Each line is the increase over the previous step, so base plus
        // lines equals the unrounded total.
        let option_costs = vec![
            OptionCost::new("material", with_material - base_price),
            OptionCost::new("finish", mul(with_material, finish - Decimal::ONE)?),
        ];

        Ok(PriceBreakdown {
            variant: Widget::QuickQuote,
            quantity,
            base_price,
            option_costs,
            subtotal: total,
            discount_fraction: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total,
            unit_price: div_quantity(total, quantity)?,
            estimated_weight_kg: None,
            delivery: None,
        })
    }
}
