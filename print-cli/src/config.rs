//! `print-estimator.toml` loading.
//!
//! ```toml
//! breakpoints_csv = "pricing/comic_breakpoints.csv"
//!
//! [store]
//! backend = "sqlite"
//! connection_string = "quotes.db"
//! history_cap = 50
//!
//! [logging]
//! level = "debug"
//! file = "estimator.log"
//!
//! [quote_request]
//! delay_ms = 1000
//! timeout_ms = 5000
//!
//! [pricing.generic.unit_base]
//! business-cards = "0.55"
//!
//! [pricing.comic_book]
//! extrapolation_factor = "0.85"
//! ```
//!
//! Rate maps are keyed by the option's control value. Unknown keys are
//! logged and skipped. Every section is optional.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use print_core::db::StoreConfig;
use print_core::models::{
    BoardThickness, BookType, ColorMode, ComicBinding, ComicPaper, CoverStock, FinishType,
    Lamination, PaperType, ProductType, QuickFinish, QuickMaterial, TrimSize, Turnaround,
};
use print_core::tables::PricingTable;
use print_data::{PricingLoaderError, apply_overrides};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "PRINT_ESTIMATOR_CONFIG";

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "print-estimator.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Pricing(#[from] PricingLoaderError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub quote_request: QuoteRequestConfig,
    pub pricing: PricingOverrides,
    pub breakpoints_csv: Option<PathBuf>,
    pub discounts_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuoteRequestConfig {
    pub delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for QuoteRequestConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1_000,
            timeout_ms: 10_000,
        }
    }
}

type RateOverrides = BTreeMap<String, Decimal>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PricingOverrides {
    pub generic: GenericOverrides,
    pub childrens_book: ChildrensBookOverrides,
    pub comic_book: ComicBookOverrides,
    pub quick_quote: QuickQuoteOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenericOverrides {
    pub unit_base: RateOverrides,
    pub paper: RateOverrides,
    pub finish: RateOverrides,
    pub color: RateOverrides,
    pub turnaround: RateOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChildrensBookOverrides {
    pub book_base: RateOverrides,
    pub fallback_book_base: Option<Decimal>,
    pub size_multiplier: RateOverrides,
    pub pages_per_step: Option<u32>,
    pub page_step_rate: Option<Decimal>,
    pub cover_surcharge: RateOverrides,
    pub lamination_surcharge: RateOverrides,
    pub thickness_surcharge: RateOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComicBookOverrides {
    pub paper_upgrade: RateOverrides,
    pub binding_cost: RateOverrides,
    pub reference_pages: Option<u32>,
    pub extrapolation_factor: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuickQuoteOverrides {
    pub material: RateOverrides,
    pub finish: RateOverrides,
}

fn merge_rates<K: Ord>(
    table: &'static str,
    target: &mut BTreeMap<K, Decimal>,
    overrides: &RateOverrides,
    parse: fn(&str) -> Option<K>,
) {
    for (key, rate) in overrides {
        match parse(key) {
            Some(option) => {
                debug!(table, option = %key, %rate, "Overriding rate");
                target.insert(option, *rate);
            }
            None => warn!(table, option = %key, "Ignoring rate for unknown option"),
        }
    }
}

fn merge_value<T: Copy>(
    target: &mut T,
    value: Option<T>,
) {
    if let Some(value) = value {
        *target = value;
    }
}

impl PricingOverrides {
    /// Writes every override into `table`.
    pub fn apply_to(
        &self,
        table: &mut PricingTable,
    ) {
        let generic = &mut table.generic;
        merge_rates("unit_base", &mut generic.unit_base, &self.generic.unit_base, ProductType::parse);
        merge_rates("paper", &mut generic.paper, &self.generic.paper, PaperType::parse);
        merge_rates("finish", &mut generic.finish, &self.generic.finish, FinishType::parse);
        merge_rates("color", &mut generic.color, &self.generic.color, ColorMode::parse);
        merge_rates(
            "turnaround",
            &mut generic.turnaround,
            &self.generic.turnaround,
            Turnaround::parse,
        );

        let book = &mut table.childrens_book;
        let book_overrides = &self.childrens_book;
        merge_rates("book_base", &mut book.book_base, &book_overrides.book_base, BookType::parse);
        merge_rates(
            "size_multiplier",
            &mut book.size_multiplier,
            &book_overrides.size_multiplier,
            TrimSize::parse,
        );
        merge_rates(
            "cover_surcharge",
            &mut book.cover_surcharge,
            &book_overrides.cover_surcharge,
            CoverStock::parse,
        );
        merge_rates(
            "lamination_surcharge",
            &mut book.lamination_surcharge,
            &book_overrides.lamination_surcharge,
            Lamination::parse,
        );
        merge_rates(
            "thickness_surcharge",
            &mut book.thickness_surcharge,
            &book_overrides.thickness_surcharge,
            BoardThickness::parse,
        );
        merge_value(&mut book.fallback_book_base, book_overrides.fallback_book_base);
        merge_value(&mut book.page_step_rate, book_overrides.page_step_rate);
        // A zero step would divide by zero in the page-step count.
        merge_value(
            &mut book.pages_per_step,
            book_overrides.pages_per_step.filter(|n| *n > 0),
        );

        let comic = &mut table.comic_book;
        merge_rates(
            "paper_upgrade",
            &mut comic.paper_upgrade,
            &self.comic_book.paper_upgrade,
            ComicPaper::parse,
        );
        merge_rates(
            "binding_cost",
            &mut comic.binding_cost,
            &self.comic_book.binding_cost,
            ComicBinding::parse,
        );
        merge_value(
            &mut comic.reference_pages,
            self.comic_book.reference_pages.filter(|n| *n > 0),
        );
        merge_value(&mut comic.extrapolation_factor, self.comic_book.extrapolation_factor);

        let quick = &mut table.quick_quote;
        merge_rates("material", &mut quick.material, &self.quick_quote.material, QuickMaterial::parse);
        merge_rates("finish", &mut quick.finish, &self.quick_quote.finish, QuickFinish::parse);
    }
}

impl AppConfig {
    pub fn from_toml_str(
        input: &str,
        origin: &str,
    ) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents, &path.display().to_string())?;
        config.resolve_relative_paths(path.parent().unwrap_or(Path::new(".")));
        Ok(config)
    }

    /// Finds the config file: the explicit path, then the environment
    /// variable, then `print-estimator.toml` in `cwd`. `None` means run on
    /// defaults.
    pub fn locate(
        explicit: Option<&Path>,
        env_value: Option<&str>,
        cwd: &Path,
    ) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(value));
        }
        let local = cwd.join(DEFAULT_CONFIG_FILE);
        local.is_file().then_some(local)
    }

    /// Loads whichever file [`locate`](Self::locate) finds in the process
    /// environment, or the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env_value = std::env::var(CONFIG_ENV_VAR).ok();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        match Self::locate(explicit, env_value.as_deref(), &cwd) {
            Some(path) => {
                let config = Self::load(&path)?;
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Paths inside the file are relative to the file itself.
    fn resolve_relative_paths(
        &mut self,
        base: &Path,
    ) {
        for path in [
            &mut self.breakpoints_csv,
            &mut self.discounts_csv,
            &mut self.logging.file,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// The built-in pricing table with this config's overrides applied:
    /// CSV files first, then the `[pricing]` section.
    pub fn pricing_table(&self) -> Result<PricingTable, ConfigError> {
        let mut table = PricingTable::default();
        apply_overrides(
            &mut table,
            self.breakpoints_csv.as_deref(),
            self.discounts_csv.as_deref(),
        )?;
        self.pricing.apply_to(&mut table);
        Ok(table)
    }
}
