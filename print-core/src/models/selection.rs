use serde::{Deserialize, Serialize};

use super::options::{
    BoardThickness, BookBinding, BookType, ColorMode, ComicBinding, ComicPaper, CoverStock,
    FinishType, Lamination, PaperType, ProductType, QuickFinish, QuickMaterial, TrimSize,
    Turnaround,
};
use rust_decimal::Decimal;

/// The pricing widgets offered by the storefront. Each one selects a
/// formula variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Widget {
    Generic,
    ChildrensBook,
    ComicBook,
    QuickQuote,
}

impl Widget {
    pub const ALL: &'static [Widget] = &[
        Widget::Generic,
        Widget::ChildrensBook,
        Widget::ComicBook,
        Widget::QuickQuote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::ChildrensBook => "childrens-book",
            Self::ComicBook => "comic-book",
            Self::QuickQuote => "quick-quote",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Some(Self::Generic),
            "childrens-book" | "childrens" => Some(Self::ChildrensBook),
            "comic-book" | "comic" => Some(Self::ComicBook),
            "quick-quote" | "quick" => Some(Self::QuickQuote),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Generic => "Print Products",
            Self::ChildrensBook => "Children's Book",
            Self::ComicBook => "Comic Book",
            Self::QuickQuote => "Quick Quote",
        }
    }
}

impl std::fmt::Display for Widget {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection state of the generic print-product calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericSelection {
    pub product_type: ProductType,
    pub quantity: u32,
    pub paper: PaperType,
    pub finish: FinishType,
    pub color: ColorMode,
    pub turnaround: Turnaround,
}

impl Default for GenericSelection {
    fn default() -> Self {
        Self {
            product_type: ProductType::BusinessCards,
            quantity: 100,
            paper: PaperType::Standard,
            finish: FinishType::Matte,
            color: ColorMode::Bw,
            turnaround: Turnaround::Standard,
        }
    }
}

/// Selection state of the children's book calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildrensBookSelection {
    pub book_type: BookType,
    pub trim_size: TrimSize,
    pub binding: BookBinding,
    pub page_count: u32,
    pub quantity: u32,
    pub cover: CoverStock,
    pub lamination: Lamination,
    pub thickness: BoardThickness,
}

impl Default for ChildrensBookSelection {
    fn default() -> Self {
        Self {
            book_type: BookType::Hardcover,
            trim_size: TrimSize::Letter,
            binding: BookBinding::Sewing,
            page_count: 24,
            quantity: 100,
            cover: CoverStock::Digital,
            lamination: Lamination::Matte,
            thickness: BoardThickness::TwoMm,
        }
    }
}

/// Selection state of the comic book calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicBookSelection {
    pub quantity: u32,
    pub page_count: u32,
    pub paper: ComicPaper,
    pub binding: ComicBinding,
}

impl Default for ComicBookSelection {
    fn default() -> Self {
        Self {
            quantity: 100,
            page_count: 32,
            paper: ComicPaper::Gsm80,
            binding: ComicBinding::Saddle,
        }
    }
}

/// Selection state of the product gallery's quick quote.
///
/// `unit_price` is the listed price of the gallery item being quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickQuoteSelection {
    pub unit_price: Decimal,
    pub material: QuickMaterial,
    pub finish: QuickFinish,
    pub quantity: u32,
}

impl Default for QuickQuoteSelection {
    fn default() -> Self {
        Self {
            unit_price: Decimal::ZERO,
            material: QuickMaterial::Standard,
            finish: QuickFinish::Matte,
            quantity: 100,
        }
    }
}

/// A fully resolved selection. The variant decides which formula prices it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "kebab-case")]
pub enum OptionSelection {
    Generic(GenericSelection),
    ChildrensBook(ChildrensBookSelection),
    ComicBook(ComicBookSelection),
    QuickQuote(QuickQuoteSelection),
}

impl OptionSelection {
    pub fn widget(&self) -> Widget {
        match self {
            Self::Generic(_) => Widget::Generic,
            Self::ChildrensBook(_) => Widget::ChildrensBook,
            Self::ComicBook(_) => Widget::ComicBook,
            Self::QuickQuote(_) => Widget::QuickQuote,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            Self::Generic(s) => s.quantity,
            Self::ChildrensBook(s) => s.quantity,
            Self::ComicBook(s) => s.quantity,
            Self::QuickQuote(s) => s.quantity,
        }
    }

    /// The selection a widget shows before the user touches anything.
    pub fn default_for(widget: Widget) -> Self {
        match widget {
            Widget::Generic => Self::Generic(GenericSelection::default()),
            Widget::ChildrensBook => Self::ChildrensBook(ChildrensBookSelection::default()),
            Widget::ComicBook => Self::ComicBook(ComicBookSelection::default()),
            Widget::QuickQuote => Self::QuickQuote(QuickQuoteSelection::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn widget_parse_accepts_short_names() {
        assert_eq!(Widget::parse("comic"), Some(Widget::ComicBook));
        assert_eq!(Widget::parse("childrens-book"), Some(Widget::ChildrensBook));
        assert_eq!(Widget::parse("poster"), None);
    }

    #[test]
    fn default_for_matches_widget() {
        for widget in Widget::ALL {
            assert_eq!(OptionSelection::default_for(*widget).widget(), *widget);
        }
    }

    #[test]
    fn selection_serializes_with_widget_tag() {
        let selection = OptionSelection::ComicBook(ComicBookSelection::default());

        let json = serde_json::to_value(&selection).unwrap();

        assert_eq!(json["widget"], "comic-book");
        assert_eq!(json["binding"], "saddle");
        assert_eq!(json["page_count"], 32);
    }
}
