//! Pricing tables for every widget.
//!
//! [`PricingTable::default`] is the storefront's built-in catalog. Sections
//! can be replaced wholesale from configuration, and breakpoint tables and
//! discount tiers can also be loaded from CSV.

use std::collections::BTreeMap;
use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{
    BreakpointTable, CalculationError, DiscountTierTable, VOLUME_EXTRAPOLATION_FACTOR,
};
use crate::models::{
    BoardThickness, BookType, ColorMode, ComicBinding, ComicPaper, CoverStock, FinishType,
    Lamination, PaperType, ProductType, QuickFinish, QuickMaterial, TrimSize, Turnaround,
};

/// Rate per 4-page imposition step in the children's book formula.
pub const PAGE_STEP_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Looks up a rate, naming the table and option when it is missing.
pub(crate) fn rate<K: Ord + Display>(
    table: &'static str,
    rates: &BTreeMap<K, Decimal>,
    key: &K,
) -> Result<Decimal, CalculationError> {
    rates
        .get(key)
        .copied()
        .ok_or_else(|| CalculationError::MissingRate {
            table,
            option: key.to_string(),
        })
}

/// Looks up an additive surcharge. Options without an entry cost nothing.
pub(crate) fn surcharge<K: Ord>(
    rates: &BTreeMap<K, Decimal>,
    key: &K,
) -> Decimal {
    rates.get(key).copied().unwrap_or(Decimal::ZERO)
}

/// The complete catalog of rates used by [`crate::calculations::PriceCalculator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingTable {
    pub generic: GenericRates,
    pub childrens_book: ChildrensBookRates,
    pub comic_book: ComicBookRates,
    pub quick_quote: QuickQuoteRates,
    pub discount_tiers: DiscountTierTable,
}

// ─── generic calculator ─────────────────────────────────────────────────────

/// Per-unit base cost by product, and one multiplier per option group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericRates {
    pub unit_base: BTreeMap<ProductType, Decimal>,
    pub paper: BTreeMap<PaperType, Decimal>,
    pub finish: BTreeMap<FinishType, Decimal>,
    pub color: BTreeMap<ColorMode, Decimal>,
    pub turnaround: BTreeMap<Turnaround, Decimal>,
}

impl Default for GenericRates {
    fn default() -> Self {
        Self {
            unit_base: BTreeMap::from([
                (ProductType::BusinessCards, Decimal::new(15, 2)),
                (ProductType::Brochures, Decimal::new(85, 2)),
                (ProductType::Folders, Decimal::new(125, 2)),
                (ProductType::Reports, Decimal::new(250, 2)),
                (ProductType::Posters, Decimal::new(375, 2)),
                (ProductType::Banners, Decimal::new(850, 2)),
            ]),
            paper: BTreeMap::from([
                (PaperType::Standard, Decimal::ONE),
                (PaperType::Premium, Decimal::new(13, 1)),
                (PaperType::Luxury, Decimal::new(16, 1)),
                (PaperType::Recycled, Decimal::new(11, 1)),
            ]),
            finish: BTreeMap::from([
                (FinishType::Matte, Decimal::ONE),
                (FinishType::Gloss, Decimal::new(11, 1)),
                (FinishType::Satin, Decimal::new(115, 2)),
                (FinishType::Velvet, Decimal::new(125, 2)),
                (FinishType::Uv, Decimal::new(14, 1)),
            ]),
            color: BTreeMap::from([
                (ColorMode::Bw, Decimal::ONE),
                (ColorMode::Color, Decimal::new(15, 1)),
                (ColorMode::Spot, Decimal::new(18, 1)),
                (ColorMode::Metallic, Decimal::new(22, 1)),
            ]),
            turnaround: BTreeMap::from([
                (Turnaround::Rush, Decimal::new(25, 1)),
                (Turnaround::Fast, Decimal::new(15, 1)),
                (Turnaround::Standard, Decimal::ONE),
                (Turnaround::Economy, Decimal::new(8, 1)),
            ]),
        }
    }
}

// ─── children's book calculator ─────────────────────────────────────────────

/// Flat per-unit rates for children's books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildrensBookRates {
    pub book_base: BTreeMap<BookType, Decimal>,

    /// Base used when `book_base` has no entry for the selected type.
    pub fallback_book_base: Decimal,

    /// Trim sizes without an entry use a multiplier of 1.
    pub size_multiplier: BTreeMap<TrimSize, Decimal>,

    pub pages_per_step: u32,
    pub page_step_rate: Decimal,

    pub cover_surcharge: BTreeMap<CoverStock, Decimal>,
    pub lamination_surcharge: BTreeMap<Lamination, Decimal>,
    pub thickness_surcharge: BTreeMap<BoardThickness, Decimal>,
}

impl ChildrensBookRates {
    pub fn book_base_for(
        &self,
        book_type: BookType,
    ) -> Decimal {
        self.book_base
            .get(&book_type)
            .copied()
            .unwrap_or(self.fallback_book_base)
    }

    pub fn size_multiplier_for(
        &self,
        size: TrimSize,
    ) -> Decimal {
        self.size_multiplier
            .get(&size)
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

impl Default for ChildrensBookRates {
    fn default() -> Self {
        Self {
            book_base: BTreeMap::from([
                (BookType::Hardcover, Decimal::from(25)),
                (BookType::Softcover, Decimal::from(12)),
                (BookType::Saddle, Decimal::from(8)),
                (BookType::Board, Decimal::from(30)),
            ]),
            fallback_book_base: Decimal::from(15),
            size_multiplier: BTreeMap::from([
                (TrimSize::Letter, Decimal::new(12, 1)),
                (TrimSize::SixByNine, Decimal::ONE),
                (TrimSize::Digest, Decimal::new(9, 1)),
                (TrimSize::EightByTen, Decimal::new(11, 1)),
            ]),
            pages_per_step: 4,
            page_step_rate: PAGE_STEP_RATE,
            cover_surcharge: BTreeMap::from([
                (CoverStock::Digital, Decimal::ZERO),
                (CoverStock::Offset, Decimal::from(3)),
                (CoverStock::Leather, Decimal::from(8)),
            ]),
            lamination_surcharge: BTreeMap::from([
                (Lamination::Matte, Decimal::ZERO),
                (Lamination::Gloss, Decimal::ONE),
                (Lamination::Soft, Decimal::from(2)),
            ]),
            thickness_surcharge: BTreeMap::from([
                (BoardThickness::TwoMm, Decimal::ZERO),
                (BoardThickness::TwoAndHalfMm, Decimal::ONE),
                (BoardThickness::ThreeMm, Decimal::from(2)),
            ]),
        }
    }
}

// ─── comic book calculator ──────────────────────────────────────────────────

/// Interpolated order costs per binding, plus flat upgrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComicBookRates {
    pub breakpoints: BTreeMap<ComicBinding, BreakpointTable>,
    pub paper_upgrade: BTreeMap<ComicPaper, Decimal>,
    pub binding_cost: BTreeMap<ComicBinding, Decimal>,

    /// Page count the breakpoint prices were calibrated for.
    pub reference_pages: u32,

    pub extrapolation_factor: Decimal,
}

impl ComicBookRates {
    /// The breakpoint table for a binding.
    pub fn table_for(
        &self,
        binding: ComicBinding,
    ) -> Result<&BreakpointTable, CalculationError> {
        self.breakpoints
            .get(&binding)
            .ok_or(CalculationError::EmptyPriceTable)
    }
}

fn breakpoints(points: [(u32, i64); 5]) -> BreakpointTable {
    points
        .into_iter()
        .map(|(q, p)| (q, Decimal::from(p)))
        .collect()
}

impl Default for ComicBookRates {
    fn default() -> Self {
        Self {
            breakpoints: BTreeMap::from([
                (
                    ComicBinding::Saddle,
                    breakpoints([(25, 180), (50, 220), (100, 285), (250, 580), (500, 980)]),
                ),
                (
                    ComicBinding::Perfect,
                    breakpoints([(25, 220), (50, 285), (100, 380), (250, 750), (500, 1280)]),
                ),
                (
                    ComicBinding::Hardcover,
                    breakpoints([(25, 380), (50, 480), (100, 680), (250, 1380), (500, 2280)]),
                ),
            ]),
            paper_upgrade: BTreeMap::from([
                (ComicPaper::Gsm80, Decimal::ZERO),
                (ComicPaper::Gsm100, Decimal::from(25)),
            ]),
            binding_cost: BTreeMap::from([
                (ComicBinding::Saddle, Decimal::ZERO),
                (ComicBinding::Perfect, Decimal::from(141)),
                (ComicBinding::Hardcover, Decimal::from(285)),
            ]),
            reference_pages: 32,
            extrapolation_factor: VOLUME_EXTRAPOLATION_FACTOR,
        }
    }
}

// ─── product gallery quick quote ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickQuoteRates {
    pub material: BTreeMap<QuickMaterial, Decimal>,
    pub finish: BTreeMap<QuickFinish, Decimal>,
}

impl Default for QuickQuoteRates {
    fn default() -> Self {
        Self {
            material: BTreeMap::from([
                (QuickMaterial::Standard, Decimal::ONE),
                (QuickMaterial::Premium, Decimal::new(13, 1)),
                (QuickMaterial::Luxury, Decimal::new(16, 1)),
            ]),
            finish: BTreeMap::from([
                (QuickFinish::Matte, Decimal::ONE),
                (QuickFinish::Gloss, Decimal::new(11, 1)),
                (QuickFinish::Velvet, Decimal::new(12, 1)),
            ]),
        }
    }
}
