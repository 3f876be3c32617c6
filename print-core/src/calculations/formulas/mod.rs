//! Formula variants and the calculator that dispatches between them.
//!
//! | Widget         | Formula                                  |
//! |----------------|------------------------------------------|
//! | generic        | [`GenericFormula`]: multiplicative stack |
//! | childrens-book | [`ChildrensBookFormula`]: flat per unit  |
//! | comic-book     | [`ComicBookFormula`]: interpolated table |
//! | quick-quote    | [`QuickQuoteFormula`]: gallery item      |

pub mod childrens_book;
pub mod comic_book;
pub mod generic;
pub mod quick_quote;

use chrono::{Local, NaiveDate};
use tracing::debug;

pub use childrens_book::ChildrensBookFormula;
pub use comic_book::ComicBookFormula;
pub use generic::GenericFormula;
pub use quick_quote::QuickQuoteFormula;

use super::CalculationError;
use crate::models::{OptionSelection, PriceBreakdown};
use crate::tables::PricingTable;

/// Prices any [`OptionSelection`] against one [`PricingTable`].
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use print_core::calculations::PriceCalculator;
/// use print_core::models::{ComicBookSelection, OptionSelection};
///
/// let calculator = PriceCalculator::default();
/// let selection = OptionSelection::ComicBook(ComicBookSelection {
///     quantity: 75,
///     ..ComicBookSelection::default()
/// });
///
/// let breakdown = calculator.calculate(&selection).unwrap();
///
/// assert_eq!(breakdown.total, dec!(253));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PriceCalculator {
    table: PricingTable,
}

impl PriceCalculator {
    pub fn new(table: PricingTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PricingTable {
        &self.table
    }

    /// Prices a selection, dating any delivery estimate from today.
    pub fn calculate(
        &self,
        selection: &OptionSelection,
    ) -> Result<PriceBreakdown, CalculationError> {
        self.calculate_on(selection, Local::now().date_naive())
    }

    /// Prices a selection with an explicit "today" for delivery dates.
    pub fn calculate_on(
        &self,
        selection: &OptionSelection,
        today: NaiveDate,
    ) -> Result<PriceBreakdown, CalculationError> {
        let breakdown = match selection {
            OptionSelection::Generic(s) => {
                GenericFormula::new(&self.table.generic).calculate(s, today)
            }
            OptionSelection::ChildrensBook(s) => {
                ChildrensBookFormula::new(&self.table.childrens_book, &self.table.discount_tiers)
                    .calculate(s)
            }
            OptionSelection::ComicBook(s) => {
                ComicBookFormula::new(&self.table.comic_book).calculate(s)
            }
            OptionSelection::QuickQuote(s) => {
                QuickQuoteFormula::new(&self.table.quick_quote).calculate(s)
            }
        }?;

        debug!(
            widget = %breakdown.variant,
            quantity = breakdown.quantity,
            total = %breakdown.total,
            "Calculated price"
        );

        Ok(breakdown)
    }
}
