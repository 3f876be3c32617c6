use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::breakdown::PriceBreakdown;
use super::selection::{OptionSelection, Widget};

/// Human-facing quote reference such as `QT-2025-042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteNumber(String);

impl QuoteNumber {
    /// Draws a new quote number for `year` with a random 1..=1000 suffix.
    pub fn generate(year: i32) -> Self {
        let n: u32 = rand::thread_rng().gen_range(1..=1000);
        Self::from_parts(year, n)
    }

    /// Generates a quote number for the current UTC year.
    pub fn generate_now() -> Self {
        Self::generate(Utc::now().year())
    }

    pub fn from_parts(
        year: i32,
        sequence: u32,
    ) -> Self {
        Self(format!("QT-{year}-{sequence:03}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for QuoteNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for QuoteNumber {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the saved-calculation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuote {
    pub id: i64,
    pub quote_number: QuoteNumber,
    pub widget: Widget,
    pub selection: OptionSelection,
    pub total: Decimal,
    pub unit_price: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// For saving new quotes (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSavedQuote {
    pub quote_number: QuoteNumber,
    pub widget: Widget,
    pub selection: OptionSelection,
    pub total: Decimal,
    pub unit_price: Decimal,
    pub currency: String,
}

impl NewSavedQuote {
    /// Captures a priced selection for the history.
    pub fn from_breakdown(
        quote_number: QuoteNumber,
        selection: &OptionSelection,
        breakdown: &PriceBreakdown,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            quote_number,
            widget: selection.widget(),
            selection: selection.clone(),
            total: breakdown.total,
            unit_price: breakdown.unit_price,
            currency: currency.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_parts_zero_pads_sequence() {
        assert_eq!(QuoteNumber::from_parts(2025, 7).as_str(), "QT-2025-007");
        assert_eq!(QuoteNumber::from_parts(2025, 1000).as_str(), "QT-2025-1000");
    }

    #[test]
    fn generate_stays_in_range() {
        for _ in 0..200 {
            let number = QuoteNumber::generate(2026);
            let suffix: u32 = number
                .as_str()
                .trim_start_matches("QT-2026-")
                .parse()
                .unwrap();
            assert!((1..=1000).contains(&suffix));
        }
    }
}
