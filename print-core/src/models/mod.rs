mod breakdown;
mod options;
mod saved_quote;
mod selection;

pub use breakdown::{OptionCost, PriceBreakdown};
pub use options::{
    BoardThickness, BookBinding, BookType, ColorMode, ComicBinding, ComicPaper, CoverStock,
    FinishType, Lamination, PaperType, ProductType, QuickFinish, QuickMaterial, TrimSize,
    Turnaround,
};
pub use saved_quote::{NewSavedQuote, QuoteNumber, SavedQuote};
pub use selection::{
    ChildrensBookSelection, ComicBookSelection, GenericSelection, OptionSelection,
    QuickQuoteSelection, Widget,
};
