//! Price calculation modules for the storefront widgets.
//!
//! Each widget prices its selection with one formula variant under
//! [`formulas`]. Discount tiers, breakpoint interpolation and rounding are
//! shared by all of them.

pub mod common;
pub mod delivery;
pub mod discount;
pub mod formulas;
pub mod interpolation;

use thiserror::Error;

pub use delivery::DeliveryEstimate;
pub use discount::{DiscountTierError, DiscountTierTable};
pub use formulas::{
    ChildrensBookFormula, ComicBookFormula, GenericFormula, PriceCalculator, QuickQuoteFormula,
};
pub use interpolation::{BreakpointTable, VOLUME_EXTRAPOLATION_FACTOR};

/// Errors raised while evaluating a price formula.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// A breakpoint table with no points cannot price anything.
    #[error("price table has no breakpoints")]
    EmptyPriceTable,

    /// The pricing table has no entry for a selected option.
    #[error("no {table} rate for '{option}'")]
    MissingRate { table: &'static str, option: String },

    /// Decimal arithmetic overflowed.
    #[error("arithmetic overflow during {0}")]
    Overflow(&'static str),
}
