//! Multiplicative option stack used by the generic print-product calculator.
//!
//! ```text
//! base      = unit_base(product) × quantity
//! total     = base × paper × finish × color × turnaround
//! unit      = total / quantity
//! option_X  = base × (multiplier_X − 1)     display only
//! ```
//!
//! No volume discount applies, so `subtotal == total`.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calculations::CalculationError;
use crate::calculations::common::{div_quantity, mul, product_of};
use crate::calculations::delivery::DeliveryEstimate;
use crate::models::{GenericSelection, OptionCost, PriceBreakdown, Widget};
use crate::tables::{GenericRates, rate};

pub struct GenericFormula<'a> {
    rates: &'a GenericRates,
}

impl<'a> GenericFormula<'a> {
    pub fn new(rates: &'a GenericRates) -> Self {
        Self { rates }
    }

    pub fn calculate(
        &self,
        selection: &GenericSelection,
        today: NaiveDate,
    ) -> Result<PriceBreakdown, CalculationError> {
        let quantity = selection.quantity.max(1);
        let base_price = self.base_price(selection, quantity)?;
        let multipliers = self.multipliers(selection)?;

        let factors: Vec<Decimal> = multipliers.iter().map(|(_, m)| *m).collect();
        let total = product_of(base_price, &factors)?;

        let option_costs = multipliers
            .iter()
            .map(|(name, m)| -> Result<OptionCost, CalculationError> {
                Ok(OptionCost::new(*name, mul(base_price, *m - Decimal::ONE)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PriceBreakdown {
            variant: Widget::Generic,
            quantity,
            base_price,
            option_costs,
            subtotal: total,
            discount_fraction: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total,
            unit_price: div_quantity(total, quantity)?,
            estimated_weight_kg: None,
            delivery: Some(DeliveryEstimate::from_date(selection.turnaround, today)),
        })
    }

    fn base_price(
        &self,
        selection: &GenericSelection,
        quantity: u32,
    ) -> Result<Decimal, CalculationError> {
        let unit_base = rate("product", &self.rates.unit_base, &selection.product_type)?;
        mul(unit_base, Decimal::from(quantity))
    }

    /// Option multipliers in display order.
    fn multipliers(
        &self,
        selection: &GenericSelection,
    ) -> Result<[(&'static str, Decimal); 4], CalculationError> {
        Ok([
            ("paper", rate("paper", &self.rates.paper, &selection.paper)?),
            ("finish", rate("finish", &self.rates.finish, &selection.finish)?),
            ("color", rate("color", &self.rates.color, &selection.color)?),
            (
                "turnaround",
                rate("turnaround", &self.rates.turnaround, &selection.turnaround)?,
            ),
        ])
    }
}
