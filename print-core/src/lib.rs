pub mod calculations;
pub mod db;
pub mod estimator;
pub mod format;
pub mod models;
pub mod resolver;
pub mod tables;

pub use calculations::{CalculationError, PriceCalculator};
pub use db::repository::{QuoteRepository, RepositoryError};
pub use estimator::{PriceEstimator, SelectionEvent};
pub use format::{BreakdownDisplay, Currency};
pub use models::*;
pub use resolver::RawSelection;
pub use tables::PricingTable;
