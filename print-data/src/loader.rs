//! CSV loaders for pricing-table overrides.
//!
//! ## Breakpoints
//!
//! | Column     | Type    | Notes                                 |
//! |------------|---------|---------------------------------------|
//! | `binding`  | string  | One of: `saddle`, `perfect`, `hardcover` |
//! | `quantity` | integer | Calibration quantity, at least 1      |
//! | `price`    | decimal | Order cost at that quantity           |
//!
//! ```csv
//! binding,quantity,price
//! saddle,25,180
//! saddle,50,220
//! ```
//!
//! ## Discount tiers
//!
//! | Column         | Type    | Notes                       |
//! |----------------|---------|-----------------------------|
//! | `min_quantity` | integer | Smallest quantity in the tier |
//! | `fraction`     | decimal | Discount in `[0, 1)`        |
//!
//! Rows may appear in any order. Row numbers in errors are 1-based and
//! exclude the header.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use print_core::calculations::{BreakpointTable, DiscountTierError, DiscountTierTable};
use print_core::models::ComicBinding;
use print_core::tables::PricingTable;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PricingLoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV parse error on row {row}: {message}")]
    CsvParse { row: usize, message: String },

    #[error("unrecognised binding '{binding}' on row {row}")]
    UnknownBinding { binding: String, row: usize },

    #[error("quantity must be at least 1 on row {row}")]
    ZeroQuantity { row: usize },

    #[error("negative price {price} on row {row}")]
    NegativePrice { price: Decimal, row: usize },

    #[error("quantity {quantity} appears twice on row {row}")]
    DuplicateQuantity { quantity: u32, row: usize },

    #[error("invalid discount tiers: {0}")]
    InvalidTiers(#[from] DiscountTierError),

    #[error("no rows found")]
    Empty,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BreakpointRecord {
    pub binding: String,
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DiscountTierRecord {
    pub min_quantity: u32,
    pub fraction: Decimal,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader)
}

fn read_records<R: Read, T: for<'de> Deserialize<'de>>(
    reader: R
) -> Result<Vec<(usize, T)>, PricingLoaderError> {
    let records = csv_reader(reader)
        .deserialize::<T>()
        .enumerate()
        .map(|(idx, result)| {
            let row = idx + 1;
            result
                .map(|record| (row, record))
                .map_err(|e| PricingLoaderError::CsvParse {
                    row,
                    message: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(PricingLoaderError::Empty);
    }
    Ok(records)
}

fn read_file(path: &Path) -> Result<std::fs::File, PricingLoaderError> {
    std::fs::File::open(path).map_err(|source| PricingLoaderError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loader for comic book breakpoint tables.
pub struct BreakpointLoader;

impl BreakpointLoader {
    /// Parses breakpoints into one table per binding.
    pub fn parse<R: Read>(
        reader: R
    ) -> Result<BTreeMap<ComicBinding, BreakpointTable>, PricingLoaderError> {
        let mut tables: BTreeMap<ComicBinding, BreakpointTable> = BTreeMap::new();

        for (row, record) in read_records::<_, BreakpointRecord>(reader)? {
            let binding = ComicBinding::parse(&record.binding).ok_or_else(|| {
                PricingLoaderError::UnknownBinding {
                    binding: record.binding.clone(),
                    row,
                }
            })?;
            if record.quantity == 0 {
                return Err(PricingLoaderError::ZeroQuantity { row });
            }
            if record.price < Decimal::ZERO {
                return Err(PricingLoaderError::NegativePrice {
                    price: record.price,
                    row,
                });
            }

            let table = tables.entry(binding).or_default();
            if table.get(record.quantity).is_some() {
                return Err(PricingLoaderError::DuplicateQuantity {
                    quantity: record.quantity,
                    row,
                });
            }
            table.insert(record.quantity, record.price);
        }

        Ok(tables)
    }

    pub fn load_from_file(
        path: &Path
    ) -> Result<BTreeMap<ComicBinding, BreakpointTable>, PricingLoaderError> {
        Self::parse(read_file(path)?)
    }
}

/// Loader for volume discount tiers.
pub struct DiscountTierLoader;

impl DiscountTierLoader {
    /// Parses and validates a tier table.
    pub fn parse<R: Read>(reader: R) -> Result<DiscountTierTable, PricingLoaderError> {
        let mut tiers = BTreeMap::new();
        for (row, record) in read_records::<_, DiscountTierRecord>(reader)? {
            if tiers.insert(record.min_quantity, record.fraction).is_some() {
                return Err(PricingLoaderError::DuplicateQuantity {
                    quantity: record.min_quantity,
                    row,
                });
            }
        }
        Ok(DiscountTierTable::new(tiers)?)
    }

    pub fn load_from_file(path: &Path) -> Result<DiscountTierTable, PricingLoaderError> {
        Self::parse(read_file(path)?)
    }
}

/// Replaces the pricing table's breakpoint tables and discount tiers with
/// whichever override files are given. Bindings missing from the
/// breakpoint file keep their built-in tables.
pub fn apply_overrides(
    table: &mut PricingTable,
    breakpoints: Option<&Path>,
    discounts: Option<&Path>,
) -> Result<(), PricingLoaderError> {
    if let Some(path) = breakpoints {
        let loaded = BreakpointLoader::load_from_file(path)?;
        info!(path = %path.display(), bindings = loaded.len(), "Loaded breakpoint overrides");
        table.comic_book.breakpoints.extend(loaded);
    }
    if let Some(path) = discounts {
        let loaded = DiscountTierLoader::load_from_file(path)?;
        info!(path = %path.display(), tiers = loaded.len(), "Loaded discount tier overrides");
        table.discount_tiers = loaded;
    }
    Ok(())
}
