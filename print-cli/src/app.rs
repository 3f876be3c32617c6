//! Command handlers shared by the binary and the integration tests.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use print_core::db::RepositoryRegistry;
use print_core::models::{
    NewSavedQuote, OptionSelection, PriceBreakdown, QuoteNumber, SavedQuote, Widget,
};
use print_core::resolver::RawSelection;
use print_core::{BreakdownDisplay, Currency, PriceCalculator, PriceEstimator, QuoteRepository};
use print_data::SiteCatalog;
use print_db_sqlite::SqliteQuoteRepositoryFactory;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::csv_loader::BatchLoad;
use crate::forms::ContactForm;
use crate::quote_request::{QuoteReceipt, QuoteRequest, QuoteRequestService};
use crate::storage::JsonFileQuoteRepositoryFactory;

/// Build a [`RepositoryRegistry`] with every backend compiled into this
/// binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(JsonFileQuoteRepositoryFactory));
    registry.register(Box::new(SqliteQuoteRepositoryFactory));
    registry
}

/// Parses a `slot=value` pair as given to `--set`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (slot, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected slot=value, got '{s}'"))?;
    let slot = slot.trim();
    if slot.is_empty() {
        return Err(format!("missing slot name in '{s}'"));
    }
    Ok((slot.to_string(), value.trim().to_string()))
}

/// A selection together with its price.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedQuote {
    pub selection: OptionSelection,
    pub breakdown: PriceBreakdown,
}

impl PricedQuote {
    pub fn widget(&self) -> Widget {
        self.selection.widget()
    }

    pub fn display(&self) -> BreakdownDisplay {
        BreakdownDisplay::render(&self.breakdown)
    }

    pub fn currency(&self) -> Currency {
        Currency::for_widget(self.widget())
    }

    pub fn to_new_saved(
        &self,
        quote_number: QuoteNumber,
    ) -> NewSavedQuote {
        NewSavedQuote::from_breakdown(
            quote_number,
            &self.selection,
            &self.breakdown,
            self.currency().code(),
        )
    }
}

/// Prices one widget's raw state.
pub fn price(
    calculator: Arc<PriceCalculator>,
    widget: Widget,
    raw: RawSelection,
) -> Result<PricedQuote> {
    let mut estimator = PriceEstimator::with_raw(widget, calculator, raw);
    let breakdown = estimator
        .recalculate()
        .cloned()
        .ok_or_else(|| anyhow!("could not price the {} selection", widget.label()))?;

    Ok(PricedQuote {
        selection: estimator.selection(),
        breakdown,
    })
}

pub async fn save(
    repo: &dyn QuoteRepository,
    quote: &PricedQuote,
) -> Result<SavedQuote> {
    let saved = repo
        .save_quote(quote.to_new_saved(QuoteNumber::generate_now()))
        .await
        .context("Failed to save quote")?;
    info!(quote = %saved.quote_number, total = %saved.total, "Saved quote");
    Ok(saved)
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Priced rows with their CSV row numbers.
    pub priced: Vec<(usize, PricedQuote)>,
    /// Rows that failed to load or price.
    pub skipped: usize,
}

/// Prices every loaded row. Load errors and pricing failures are logged
/// and counted, never fatal.
pub fn price_batch(
    calculator: Arc<PriceCalculator>,
    load: BatchLoad,
) -> BatchReport {
    let mut report = BatchReport::default();

    for error in &load.errors {
        warn!(%error, "Skipping batch row");
        report.skipped += 1;
    }

    for row in load.rows {
        match price(calculator.clone(), row.widget, row.raw) {
            Ok(quote) => report.priced.push((row.row, quote)),
            Err(error) => {
                let message = format!("{error:#}");
                warn!(row = row.row, error = %message, "Skipping batch row");
                report.skipped += 1;
            }
        }
    }

    report
}

/// One line per priced row: row, widget, quantity, total, unit price.
pub fn render_batch(report: &BatchReport) -> String {
    let mut out = String::new();
    for (row, quote) in &report.priced {
        let currency = quote.currency();
        let _ = writeln!(
            out,
            "{row:>4}  {:<15} {:>6}  {:>14}  {:>12}",
            quote.widget().as_str(),
            quote.breakdown.quantity,
            currency.format(quote.breakdown.total, 2),
            currency.format(quote.breakdown.unit_price, 2),
        );
    }
    let _ = writeln!(out, "{} priced, {} skipped", report.priced.len(), report.skipped);
    out
}

fn format_money(
    amount: rust_decimal::Decimal,
    currency: &str,
) -> String {
    match Currency::parse(currency) {
        Some(c) => c.format(amount, 2),
        None => format!("{amount} {currency}"),
    }
}

/// Newest first, one line per quote.
pub fn render_history(quotes: &[SavedQuote]) -> String {
    if quotes.is_empty() {
        return "No saved quotes.\n".to_string();
    }

    let mut out = String::new();
    for quote in quotes {
        let _ = writeln!(
            out,
            "{:>4}  {}  {:<15} qty {:>6}  {:>14}  {}",
            quote.id,
            quote.quote_number,
            quote.widget.as_str(),
            quote.selection.quantity(),
            format_money(quote.total, &quote.currency),
            quote.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    out
}

pub fn render_catalog(catalog: &SiteCatalog) -> String {
    let mut out = String::from("Featured products\n");
    for product in &catalog.featured_products {
        let discount = product.discount_percent();
        let _ = write!(
            out,
            "  {:>3}  {:<28} {}",
            product.id,
            product.name,
            Currency::Inr.format(product.price_value(), 2)
        );
        if discount > 0 {
            let _ = write!(
                out,
                "  (was {}, save {discount}%)",
                Currency::Inr.format(product.original_price(), 2)
            );
        }
        out.push('\n');
    }

    if !catalog.testimonials.is_empty() {
        out.push_str("Testimonials\n");
        for t in &catalog.testimonials {
            match &t.company {
                Some(company) => {
                    let _ = writeln!(out, "  \"{}\" - {}, {company}", t.text, t.name);
                }
                None => {
                    let _ = writeln!(out, "  \"{}\" - {}", t.text, t.name);
                }
            }
        }
    }

    if !catalog.blog_posts.is_empty() {
        out.push_str("From the blog\n");
        for post in &catalog.blog_posts {
            let _ = writeln!(out, "  {}  {}", post.date, post.title);
        }
    }
    out
}

/// Sends a quote request for the quote with `quote_id`, or the most
/// recently saved quote when no id is given.
pub async fn request_quote(
    service: &QuoteRequestService,
    repo: &dyn QuoteRepository,
    contact: ContactForm,
    quote_id: Option<i64>,
    cancel: watch::Receiver<bool>,
) -> Result<QuoteReceipt> {
    let quote = match quote_id {
        Some(id) => Some(
            repo.get_quote(id)
                .await
                .with_context(|| format!("Failed to load quote {id}"))?,
        ),
        None => repo
            .list_quotes(Some(1))
            .await
            .context("Failed to read quote history")?
            .into_iter()
            .next(),
    };
    if quote.is_none() {
        warn!("No saved quote to attach, sending contact details only");
    }

    let mut request = QuoteRequest::new(contact);
    if let Some(quote) = quote {
        request = request.with_quote(quote);
    }

    service
        .submit(&request, cancel)
        .await
        .context("Quote request not sent")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use print_core::resolver::slots;
    use rust_decimal_macros::dec;

    use super::*;

    fn calculator() -> Arc<PriceCalculator> {
        Arc::new(PriceCalculator::default())
    }

    #[test]
    fn assignment_parsing() {
        assert_eq!(
            parse_assignment("paper-type=premium"),
            Ok(("paper-type".to_string(), "premium".to_string()))
        );
        assert_eq!(
            parse_assignment(" unit-price = ₹9.99 "),
            Ok(("unit-price".to_string(), "₹9.99".to_string()))
        );
        assert!(parse_assignment("premium").is_err());
        assert!(parse_assignment("=premium").is_err());
    }

    #[test]
    fn registry_offers_both_backends() {
        assert_eq!(build_registry().available_backends(), vec!["json", "sqlite"]);
    }

    #[test]
    fn prices_comic_defaults() {
        let quote = price(calculator(), Widget::ComicBook, RawSelection::new()).unwrap();

        assert_eq!(quote.breakdown.total, dec!(285));
        assert_eq!(quote.currency(), Currency::Usd);
        assert_eq!(quote.display().value_of("Total"), Some("$285.00"));
    }

    #[test]
    fn comic_totals_read_the_same_everywhere() {
        let raw = RawSelection::new().with(slots::QUANTITY, "1000");
        let quote = price(calculator(), Widget::ComicBook, raw).unwrap();
        let report = BatchReport {
            priced: vec![(1, quote.clone())],
            skipped: 0,
        };

        assert_eq!(quote.display().value_of("Total"), Some("$1764.00"));
        assert!(render_batch(&report).contains("$1764.00"));
    }

    #[test]
    fn to_new_saved_carries_currency_and_totals() {
        let raw = RawSelection::new().with(slots::QUANTITY, "100");
        let quote = price(calculator(), Widget::ChildrensBook, raw).unwrap();

        let new = quote.to_new_saved(QuoteNumber::from_parts(2025, 1));

        assert_eq!(new.currency, "INR");
        assert_eq!(new.widget, Widget::ChildrensBook);
        assert_eq!(new.total, quote.breakdown.total);
    }

    #[test]
    fn empty_history_message() {
        assert_eq!(render_history(&[]), "No saved quotes.\n");
    }

    #[test]
    fn fallback_catalog_renders() {
        let text = render_catalog(&SiteCatalog::fallback());

        assert!(text.contains("Business Card Pack"));
        assert!(text.contains("₹9.99"));
        assert!(text.contains("(was ₹12.99, save 23%)"));
        assert!(text.contains("From the blog"));
    }
}
