//! Display formatting for price breakdowns.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{round_to, round_whole};
use crate::models::{PriceBreakdown, Widget};

/// Currency a widget displays its prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Inr,
    Usd,
}

impl Currency {
    /// The comic book page quotes in dollars; everything else in rupees.
    pub fn for_widget(widget: Widget) -> Self {
        match widget {
            Widget::ComicBook => Self::Usd,
            _ => Self::Inr,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Some(Self::Inr),
            "USD" => Some(Self::Usd),
            _ => None,
        }
    }

    pub fn format(
        &self,
        amount: Decimal,
        fraction_digits: u32,
    ) -> String {
        match self {
            Self::Inr => format_inr(amount, fraction_digits),
            Self::Usd => {
                format_with_symbol("$", amount, fraction_digits, |digits| digits.to_string())
            }
        }
    }
}

/// Formats rupees with Indian digit grouping.
///
/// ```
/// use rust_decimal_macros::dec;
/// use print_core::format::format_inr;
///
/// assert_eq!(format_inr(dec!(1234567.891), 2), "₹12,34,567.89");
/// assert_eq!(format_inr(dec!(3480), 0), "₹3,480");
/// assert_eq!(format_inr(dec!(-999.5), 0), "-₹1,000");
/// ```
pub fn format_inr(
    amount: Decimal,
    fraction_digits: u32,
) -> String {
    format_with_symbol("₹", amount, fraction_digits, group_indian)
}

/// Dollars with exactly two decimals and no grouping, as the comic book
/// page shows them. Same output as `Currency::Usd.format(amount, 2)`.
pub fn format_usd(amount: Decimal) -> String {
    Currency::Usd.format(amount, 2)
}

fn format_with_symbol(
    symbol: &str,
    amount: Decimal,
    fraction_digits: u32,
    group: fn(&str) -> String,
) -> String {
    let mut rounded = round_to(amount, fraction_digits);
    rounded.rescale(fraction_digits);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };

    match fraction {
        Some(f) => format!("{sign}{symbol}{}.{f}", group(whole)),
        None => format!("{sign}{symbol}{}", group(whole)),
    }
}

/// `1234567` → `12,34,567`: the last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// `Save 10% now`, or nothing when there is no discount.
pub fn discount_badge(fraction: Decimal) -> Option<String> {
    if fraction <= Decimal::ZERO {
        return None;
    }
    let percent = round_whole(fraction * Decimal::ONE_HUNDRED).normalize();
    Some(format!("Save {percent}% now"))
}

pub fn format_weight(kg: Decimal) -> String {
    format!("Estimated weight: {} kg", kg.normalize())
}

/// One labelled row of a rendered breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub label: String,
    pub value: String,
}

impl DisplayLine {
    fn new(
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A breakdown rendered into labelled lines for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownDisplay {
    pub title: String,
    pub lines: Vec<DisplayLine>,
    pub badge: Option<String>,
    pub notes: Vec<String>,
}

impl BreakdownDisplay {
    pub fn render(breakdown: &PriceBreakdown) -> Self {
        let currency = Currency::for_widget(breakdown.variant);
        // The children's book page shows whole rupees.
        let digits = match breakdown.variant {
            Widget::ChildrensBook => 0,
            _ => 2,
        };
        let money = |amount: Decimal| currency.format(amount, digits);

        let mut lines = vec![DisplayLine::new("Base price", money(breakdown.base_price))];
        for cost in &breakdown.option_costs {
            lines.push(DisplayLine::new(title_case(&cost.option), money(cost.amount)));
        }

        if breakdown.discount_amount > Decimal::ZERO {
            lines.push(DisplayLine::new("Subtotal", money(breakdown.subtotal)));
            lines.push(DisplayLine::new(
                "Discount",
                format!("-{}", money(breakdown.discount_amount)),
            ));
        }
        lines.push(DisplayLine::new("Total", money(breakdown.total)));
        lines.push(DisplayLine::new("Unit price", money(breakdown.unit_price)));
        lines.push(DisplayLine::new("Quantity", breakdown.quantity.to_string()));

        let mut notes = Vec::new();
        if let Some(kg) = breakdown.estimated_weight_kg {
            notes.push(format_weight(kg));
        }
        if let Some(delivery) = &breakdown.delivery {
            notes.push(format!("Ready by: {}", delivery.ready_display()));
            notes.push(format!("Delivered by: {}", delivery.delivery_display()));
        }

        Self {
            title: breakdown.variant.label().to_string(),
            lines,
            badge: discount_badge(breakdown.discount_fraction),
            notes,
        }
    }

    /// Value of the first line with `label`.
    pub fn value_of(
        &self,
        label: &str,
    ) -> Option<&str> {
        self.lines
            .iter()
            .find(|l| l.label == label)
            .map(|l| l.value.as_str())
    }
}

impl fmt::Display for BreakdownDisplay {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let width = self.lines.iter().map(|l| l.label.len()).max().unwrap_or(0);
        for line in &self.lines {
            writeln!(f, "  {:<width$}  {}", line.label, line.value)?;
        }
        if let Some(badge) = &self.badge {
            writeln!(f, "  {badge}")?;
        }
        for note in &self.notes {
            writeln!(f, "  {note}")?;
        }
        Ok(())
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::PriceCalculator;
    use crate::models::{ChildrensBookSelection, ComicBookSelection, OptionSelection};

    // =========================================================================
    // currency tests
    // =========================================================================

    #[test]
    fn inr_groups_lakhs_and_crores() {
        assert_eq!(format_inr(dec!(0), 2), "₹0.00");
        assert_eq!(format_inr(dec!(999), 0), "₹999");
        assert_eq!(format_inr(dec!(1000), 0), "₹1,000");
        assert_eq!(format_inr(dec!(100000), 0), "₹1,00,000");
        assert_eq!(format_inr(dec!(123456789.5), 1), "₹12,34,56,789.5");
    }

    #[test]
    fn inr_rounds_half_away_from_zero() {
        assert_eq!(format_inr(dec!(911.625), 2), "₹911.63");
        assert_eq!(format_inr(dec!(2.5), 0), "₹3");
        assert_eq!(format_inr(dec!(-2.5), 0), "-₹3");
    }

    #[test]
    fn inr_pads_fraction_digits() {
        assert_eq!(format_inr(dec!(34.8), 2), "₹34.80");
    }

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(format_inr(dec!(-0.001), 2), "₹0.00");
    }

    #[test]
    fn usd_has_two_decimals() {
        assert_eq!(format_usd(dec!(253)), "$253.00");
        assert_eq!(format_usd(dec!(3.3733)), "$3.37");
        assert_eq!(format_usd(dec!(12345.6)), "$12345.60");
    }

    #[test]
    fn usd_is_never_grouped() {
        assert_eq!(Currency::Usd.format(dec!(1234567), 0), "$1234567");
        assert_eq!(Currency::Usd.format(dec!(1764), 2), format_usd(dec!(1764)));
        assert_eq!(format_usd(dec!(1764)), "$1764.00");
    }

    #[test]
    fn currency_follows_widget() {
        assert_eq!(Currency::for_widget(Widget::ComicBook), Currency::Usd);
        assert_eq!(Currency::for_widget(Widget::Generic), Currency::Inr);
        assert_eq!(Currency::parse("usd"), Some(Currency::Usd));
    }

    // =========================================================================
    // badge and weight tests
    // =========================================================================

    #[test]
    fn badge_only_for_positive_discount() {
        assert_eq!(discount_badge(dec!(0.10)), Some("Save 10% now".to_string()));
        assert_eq!(discount_badge(dec!(0.25)), Some("Save 25% now".to_string()));
        assert_eq!(discount_badge(dec!(0)), None);
    }

    #[test]
    fn weight_line() {
        assert_eq!(format_weight(dec!(2.4)), "Estimated weight: 2.4 kg");
        assert_eq!(format_weight(dec!(3.0)), "Estimated weight: 3 kg");
    }

    // =========================================================================
    // breakdown display tests
    // =========================================================================

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
    }

    #[test]
    fn childrens_book_display_shows_discount() {
        let breakdown = PriceCalculator::default()
            .calculate_on(
                &OptionSelection::ChildrensBook(ChildrensBookSelection {
                    quantity: 500,
                    ..ChildrensBookSelection::default()
                }),
                today(),
            )
            .unwrap();

        let display = BreakdownDisplay::render(&breakdown);

        assert_eq!(display.title, "Children's Book");
        assert_eq!(display.value_of("Total"), Some("₹15,660"));
        assert_eq!(display.value_of("Discount"), Some("-₹1,740"));
        assert_eq!(display.badge.as_deref(), Some("Save 10% now"));
        assert_eq!(display.notes, vec!["Estimated weight: 12 kg".to_string()]);
    }

    #[test]
    fn comic_display_uses_dollars() {
        let breakdown = PriceCalculator::default()
            .calculate_on(
                &OptionSelection::ComicBook(ComicBookSelection {
                    quantity: 75,
                    ..ComicBookSelection::default()
                }),
                today(),
            )
            .unwrap();

        let display = BreakdownDisplay::render(&breakdown);

        assert_eq!(display.value_of("Base price"), Some("$252.50"));
        assert_eq!(display.value_of("Binding"), Some("$0.00"));
        assert_eq!(display.value_of("Total"), Some("$253.00"));
        assert_eq!(display.value_of("Discount"), None);
        assert_eq!(display.badge, None);
    }

    #[test]
    fn generic_display_lists_delivery_dates() {
        let breakdown = PriceCalculator::default()
            .calculate_on(&OptionSelection::default_for(Widget::Generic), today())
            .unwrap();

        let text = BreakdownDisplay::render(&breakdown).to_string();

        assert!(text.starts_with("Print Products\n"));
        assert!(text.contains("Ready by: Wed, Jan 15"));
        assert!(text.contains("Delivered by: Sat, Jan 18"));
    }
}
