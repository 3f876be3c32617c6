//! Turns raw widget state into a typed [`OptionSelection`].
//!
//! Raw state is a bag of named slots holding whatever the form control held.
//! Resolution never fails: a missing slot or an unrecognised value takes the
//! widget's default, so pricing can always run.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    BoardThickness, BookBinding, BookType, ChildrensBookSelection, ColorMode, ComicBinding,
    ComicBookSelection, ComicPaper, CoverStock, FinishType, GenericSelection, Lamination,
    OptionSelection, PaperType, ProductType, QuickFinish, QuickMaterial, QuickQuoteSelection,
    TrimSize, Turnaround, Widget,
};

/// Slot names, matching the storefront's control ids and data attributes.
pub mod slots {
    pub const PRODUCT_TYPE: &str = "product-type";
    pub const QUANTITY: &str = "quantity";
    pub const PAPER_TYPE: &str = "paper-type";
    pub const FINISH_TYPE: &str = "finish-type";
    pub const COLORS: &str = "colors";
    pub const TURNAROUND: &str = "turnaround";
    pub const BOOK_TYPE: &str = "book-type";
    pub const SIZE: &str = "size";
    pub const BINDING: &str = "binding";
    pub const PAGES: &str = "pages";
    pub const COVER: &str = "cover";
    pub const LAMINATION: &str = "lamination";
    pub const THICKNESS: &str = "thickness";
    pub const PAPER: &str = "paper";
    pub const MATERIAL: &str = "material";
    pub const FINISH: &str = "finish";
    pub const UNIT_PRICE: &str = "unit-price";
}

/// Slots a widget reads. Anything else in the raw state is ignored.
pub fn slots_for(widget: Widget) -> &'static [&'static str] {
    use slots::*;
    match widget {
        Widget::Generic => &[PRODUCT_TYPE, QUANTITY, PAPER_TYPE, FINISH_TYPE, COLORS, TURNAROUND],
        Widget::ChildrensBook => &[
            BOOK_TYPE, SIZE, BINDING, PAGES, QUANTITY, COVER, LAMINATION, THICKNESS,
        ],
        Widget::ComicBook => &[QUANTITY, PAGES, PAPER, BINDING],
        Widget::QuickQuote => &[UNIT_PRICE, MATERIAL, FINISH, QUANTITY],
    }
}

/// Raw, unvalidated widget state keyed by slot name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSelection {
    slots: BTreeMap<String, String>,
}

impl RawSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        slot: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.slots.insert(slot.into(), value.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(
        mut self,
        slot: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set(slot, value);
        self
    }

    pub fn clear(
        &mut self,
        slot: &str,
    ) -> Option<String> {
        self.slots.remove(slot)
    }

    pub fn get(
        &self,
        slot: &str,
    ) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawSelection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            slots: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Resolves raw state for `widget`.
pub fn resolve(
    widget: Widget,
    raw: &RawSelection,
) -> OptionSelection {
    match widget {
        Widget::Generic => OptionSelection::Generic(resolve_generic(raw)),
        Widget::ChildrensBook => OptionSelection::ChildrensBook(resolve_childrens_book(raw)),
        Widget::ComicBook => OptionSelection::ComicBook(resolve_comic_book(raw)),
        Widget::QuickQuote => OptionSelection::QuickQuote(resolve_quick_quote(raw)),
    }
}

pub fn resolve_generic(raw: &RawSelection) -> GenericSelection {
    let d = GenericSelection::default();
    GenericSelection {
        product_type: choice(raw, slots::PRODUCT_TYPE, ProductType::parse, d.product_type),
        quantity: positive_int(raw, slots::QUANTITY, d.quantity),
        paper: choice(raw, slots::PAPER_TYPE, PaperType::parse, d.paper),
        finish: choice(raw, slots::FINISH_TYPE, FinishType::parse, d.finish),
        color: choice(raw, slots::COLORS, ColorMode::parse, d.color),
        turnaround: choice(raw, slots::TURNAROUND, Turnaround::parse, d.turnaround),
    }
}

pub fn resolve_childrens_book(raw: &RawSelection) -> ChildrensBookSelection {
    let d = ChildrensBookSelection::default();
    ChildrensBookSelection {
        book_type: choice(raw, slots::BOOK_TYPE, BookType::parse, d.book_type),
        trim_size: choice(raw, slots::SIZE, TrimSize::parse, d.trim_size),
        binding: choice(raw, slots::BINDING, BookBinding::parse, d.binding),
        page_count: positive_int(raw, slots::PAGES, d.page_count),
        quantity: positive_int(raw, slots::QUANTITY, d.quantity),
        cover: choice(raw, slots::COVER, CoverStock::parse, d.cover),
        lamination: choice(raw, slots::LAMINATION, Lamination::parse, d.lamination),
        thickness: choice(raw, slots::THICKNESS, BoardThickness::parse, d.thickness),
    }
}

pub fn resolve_comic_book(raw: &RawSelection) -> ComicBookSelection {
    let d = ComicBookSelection::default();
    ComicBookSelection {
        quantity: positive_int(raw, slots::QUANTITY, d.quantity),
        page_count: positive_int(raw, slots::PAGES, d.page_count),
        paper: choice(raw, slots::PAPER, ComicPaper::parse, d.paper),
        binding: choice(raw, slots::BINDING, ComicBinding::parse, d.binding),
    }
}

pub fn resolve_quick_quote(raw: &RawSelection) -> QuickQuoteSelection {
    let d = QuickQuoteSelection::default();
    QuickQuoteSelection {
        unit_price: price(raw, slots::UNIT_PRICE, d.unit_price),
        material: choice(raw, slots::MATERIAL, QuickMaterial::parse, d.material),
        finish: choice(raw, slots::FINISH, QuickFinish::parse, d.finish),
        quantity: positive_int(raw, slots::QUANTITY, d.quantity),
    }
}

fn choice<T: Copy>(
    raw: &RawSelection,
    slot: &str,
    parse: fn(&str) -> Option<T>,
    default: T,
) -> T {
    match raw.get(slot) {
        None => default,
        Some(value) => parse(value).unwrap_or_else(|| {
            debug!(slot, value, "Unrecognised option, using default");
            default
        }),
    }
}

fn positive_int(
    raw: &RawSelection,
    slot: &str,
    default: u32,
) -> u32 {
    let Some(value) = raw.get(slot) else {
        return default;
    };
    match parse_leading_int(value).and_then(|n| u32::try_from(n).ok()) {
        Some(n) if n > 0 => n,
        _ => {
            debug!(slot, value, default, "Invalid count, using default");
            default
        }
    }
}

fn price(
    raw: &RawSelection,
    slot: &str,
    default: Decimal,
) -> Decimal {
    let Some(value) = raw.get(slot) else {
        return default;
    };
    match parse_price(value) {
        Some(p) if p >= Decimal::ZERO => p,
        _ => {
            debug!(slot, value, "Invalid price, using default");
            default
        }
    }
}

/// Reads the leading integer of `s` the way a browser's `parseInt` does:
/// surrounding whitespace is skipped, an optional sign is honoured, and
/// parsing stops at the first non-digit. `"12 copies"` gives 12.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses a price such as `"9.99"`, `"₹9.99"` or `"$1,250.00"`.
pub fn parse_price(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .trim_start_matches(['₹', '$'])
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(cleaned.trim()).ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // default tests
    // =========================================================================

    #[test]
    fn empty_state_resolves_to_defaults() {
        let raw = RawSelection::new();

        for widget in Widget::ALL {
            assert_eq!(resolve(*widget, &raw), OptionSelection::default_for(*widget));
        }
    }

    #[test]
    fn unknown_values_fall_back_per_slot() {
        let raw = RawSelection::new()
            .with(slots::PRODUCT_TYPE, "stickers")
            .with(slots::PAPER_TYPE, "premium")
            .with(slots::COLORS, "");

        let selection = resolve_generic(&raw);

        assert_eq!(selection.product_type, ProductType::BusinessCards);
        assert_eq!(selection.paper, PaperType::Premium);
        assert_eq!(selection.color, ColorMode::Bw);
    }

    #[test]
    fn unknown_book_type_resolves_to_hardcover() {
        let raw = RawSelection::new().with(slots::BOOK_TYPE, "pop-up");

        assert_eq!(resolve_childrens_book(&raw).book_type, BookType::Hardcover);
    }

    #[test]
    fn foreign_slots_are_ignored() {
        let raw = RawSelection::new()
            .with(slots::BOOK_TYPE, "board")
            .with(slots::QUANTITY, "250");

        let selection = resolve_comic_book(&raw);

        assert_eq!(selection.quantity, 250);
        assert_eq!(selection.binding, ComicBinding::Saddle);
    }

    // =========================================================================
    // numeric parsing tests
    // =========================================================================

    #[test]
    fn leading_int_matches_parse_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  42  "), Some(42));
        assert_eq!(parse_leading_int("12 copies"), Some(12));
        assert_eq!(parse_leading_int("3.9"), Some(3));
        assert_eq!(parse_leading_int("-7"), Some(-7));
        assert_eq!(parse_leading_int("+8"), Some(8));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn non_positive_quantities_use_default() {
        for bad in ["0", "-5", "many", "", "99999999999"] {
            let raw = RawSelection::new().with(slots::QUANTITY, bad);
            assert_eq!(resolve_generic(&raw).quantity, 100, "{bad:?}");
        }
    }

    #[test]
    fn page_count_accepts_trailing_text() {
        let raw = RawSelection::new().with(slots::PAGES, "48 pages");

        assert_eq!(resolve_comic_book(&raw).page_count, 48);
    }

    #[test]
    fn unit_price_strips_currency_symbol() {
        let raw = RawSelection::new()
            .with(slots::UNIT_PRICE, "₹24.99")
            .with(slots::MATERIAL, "Luxury");

        let selection = resolve_quick_quote(&raw);

        assert_eq!(selection.unit_price, dec!(24.99));
        assert_eq!(selection.material, QuickMaterial::Luxury);
    }

    #[test]
    fn negative_unit_price_uses_default() {
        let raw = RawSelection::new().with(slots::UNIT_PRICE, "-3");

        assert_eq!(resolve_quick_quote(&raw).unit_price, dec!(0));
    }

    #[test]
    fn parse_price_handles_grouping() {
        assert_eq!(parse_price("$1,250.00"), Some(dec!(1250.00)));
        assert_eq!(parse_price("free"), None);
    }

    #[test]
    fn slots_for_covers_every_resolved_field() {
        assert_eq!(slots_for(Widget::Generic).len(), 6);
        assert_eq!(slots_for(Widget::ChildrensBook).len(), 8);
        assert_eq!(slots_for(Widget::ComicBook).len(), 4);
        assert_eq!(slots_for(Widget::QuickQuote).len(), 4);
    }
}
