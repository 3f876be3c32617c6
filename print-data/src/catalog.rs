//! Static site catalog: featured products, testimonials and blog posts.
//!
//! The storefront reads `products.json` once at startup. When the file is
//! missing or malformed it falls back to a small embedded catalog, so a
//! catalog is always available.

use std::path::Path;

use print_core::calculations::common::round_half_up;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// List prices are shown as a markdown of this "original" price.
pub const ORIGINAL_PRICE_MARKUP: Decimal = Decimal::from_parts(13, 0, 0, false, 1);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A product price as written in the catalog: either a number or display
/// text such as `"₹9.99"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductPrice {
    Amount(Decimal),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: ProductPrice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
}

impl Product {
    /// Numeric price. Text prices keep only digits and the decimal point;
    /// anything unparseable is zero.
    pub fn price_value(&self) -> Decimal {
        match &self.price {
            ProductPrice::Amount(amount) => *amount,
            ProductPrice::Text(text) => {
                let digits: String = text
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                digits.parse().unwrap_or(Decimal::ZERO)
            }
        }
    }

    /// The struck-through "was" price: list price × 1.3, to the cent.
    pub fn original_price(&self) -> Decimal {
        let price = self.price_value();
        if price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_half_up(price * ORIGINAL_PRICE_MARKUP)
    }

    /// Whole-percent saving of the list price against the original price.
    pub fn discount_percent(&self) -> u32 {
        let original = self.original_price();
        if original <= Decimal::ZERO {
            return 0;
        }
        let saving = (original - self.price_value()) / original * Decimal::ONE_HUNDRED;
        saving
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteCatalog {
    pub featured_products: Vec<Product>,
    pub testimonials: Vec<Testimonial>,
    pub blog_posts: Vec<BlogPost>,
}

impl SiteCatalog {
    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Loads `path`, or the embedded catalog if that fails. Never errors.
    pub fn load_or_fallback(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    products = catalog.featured_products.len(),
                    "Loaded site catalog"
                );
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using fallback catalog");
                Self::fallback()
            }
        }
    }

    /// The catalog shown when `products.json` cannot be loaded.
    pub fn fallback() -> Self {
        let product = |id: u32, name: &str, price: &str, category: &str| Product {
            id,
            name: name.to_string(),
            price: ProductPrice::Text(price.to_string()),
            category: Some(category.to_string()),
            image: None,
            description: None,
            features: Vec::new(),
            rating: None,
            reviews: None,
        };

        Self {
            featured_products: vec![
                product(1, "Business Card Pack", "₹9.99", "Business Cards"),
                product(2, "Brochure Design", "₹24.99", "Brochures"),
                product(3, "Folder Design", "₹19.99", "Folders"),
            ],
            testimonials: Vec::new(),
            blog_posts: vec![BlogPost {
                id: 1,
                title: "Why smartly you should use to be the perfect customer process".to_string(),
                excerpt: "Learn optimization techniques...".to_string(),
                date: "March 20, 2024".to_string(),
                category: Some("Tips".to_string()),
                image: None,
            }],
        }
    }

    pub fn product(
        &self,
        id: u32,
    ) -> Option<&Product> {
        self.featured_products.iter().find(|p| p.id == id)
    }
}
