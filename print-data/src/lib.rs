pub mod catalog;
pub mod loader;

pub use catalog::{BlogPost, CatalogError, Product, ProductPrice, SiteCatalog, Testimonial};
pub use loader::{
    BreakpointLoader, BreakpointRecord, DiscountTierLoader, DiscountTierRecord, PricingLoaderError,
    apply_overrides,
};
