use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use print_core::tables::PricingTable;
use print_data::{SiteCatalog, apply_overrides};

/// Validate pricing override files and print the resulting pricing table.
///
/// Breakpoint CSV columns: binding, quantity, price.
/// Discount tier CSV columns: min_quantity, fraction.
#[derive(Parser, Debug)]
#[command(name = "print-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV file of comic book breakpoints
    #[arg(short, long)]
    breakpoints: Option<PathBuf>,

    /// CSV file of volume discount tiers
    #[arg(short, long)]
    discounts: Option<PathBuf>,

    /// products.json to validate alongside the pricing files
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Write the merged pricing table as JSON here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut table = PricingTable::default();
    apply_overrides(
        &mut table,
        args.breakpoints.as_deref(),
        args.discounts.as_deref(),
    )
    .context("Failed to load pricing overrides")?;

    for (binding, points) in &table.comic_book.breakpoints {
        eprintln!("{binding}: {} breakpoints", points.len());
    }
    eprintln!("discount tiers: {}", table.discount_tiers.len());

    if let Some(path) = &args.catalog {
        let catalog = SiteCatalog::load(path)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
        eprintln!(
            "catalog: {} products, {} testimonials, {} blog posts",
            catalog.featured_products.len(),
            catalog.testimonials.len(),
            catalog.blog_posts.len()
        );
    }

    let json = serde_json::to_string_pretty(&table).context("Failed to serialise pricing table")?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            eprintln!("Wrote pricing table to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
