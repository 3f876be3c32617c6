use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::selection::Widget;
use crate::calculations::delivery::DeliveryEstimate;

/// Extra cost contributed by one selected option, for breakdown display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCost {
    /// Short name of the option line, e.g. `paper` or `binding`.
    pub option: String,
    pub amount: Decimal,
}

impl OptionCost {
    pub fn new(
        option: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            option: option.into(),
            amount,
        }
    }
}

/// Result of pricing one selection.
///
/// `total == subtotal - discount_amount` and
/// `discount_amount == subtotal * discount_fraction` hold for every variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub variant: Widget,
    pub quantity: u32,

    /// Base cost before options. Per-order for the generic and comic
    /// calculators, per-unit for the children's book calculator.
    pub base_price: Decimal,

    /// Option lines in display order.
    pub option_costs: Vec<OptionCost>,

    pub subtotal: Decimal,
    pub discount_fraction: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub unit_price: Decimal,

    /// Rough shipping weight in kilograms, when the widget estimates one.
    pub estimated_weight_kg: Option<Decimal>,

    /// Ready and delivery dates, when the widget quotes a turnaround.
    pub delivery: Option<DeliveryEstimate>,
}

impl PriceBreakdown {
    /// Looks up an option line by name.
    pub fn option_cost(
        &self,
        option: &str,
    ) -> Option<Decimal> {
        self.option_costs
            .iter()
            .find(|c| c.option == option)
            .map(|c| c.amount)
    }

    /// Sum of all option lines.
    pub fn options_total(&self) -> Decimal {
        self.option_costs.iter().map(|c| c.amount).sum()
    }
}
