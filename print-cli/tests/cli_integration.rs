//! End-to-end tests over the on-disk fixtures: batch pricing, config
//! loading with pricing overrides, both history backends and the quote
//! request flow.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use print_cli::app;
use print_cli::config::AppConfig;
use print_cli::csv_loader::{self, CsvLoadError};
use print_cli::forms::ContactForm;
use print_cli::quote_request::{QuoteRequestError, QuoteRequestService, cancellation};
use print_core::PriceCalculator;
use print_core::db::StoreConfig;
use print_core::models::Widget;
use print_core::resolver::{RawSelection, slots};
use rust_decimal_macros::dec;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn default_calculator() -> Arc<PriceCalculator> {
    Arc::new(PriceCalculator::default())
}

// ── batch ────────────────────────────────────────────────────────────────

#[test]
fn batch_fixture_prices_every_known_widget() {
    let load = csv_loader::load_from_file(&fixture("batch.csv")).expect("fixture should load");

    let report = app::price_batch(default_calculator(), load);

    let totals: Vec<_> = report
        .priced
        .iter()
        .map(|(row, quote)| (*row, quote.widget(), quote.breakdown.total))
        .collect();
    assert_eq!(
        totals,
        vec![
            (1, Widget::Generic, dec!(75)),
            (2, Widget::ChildrensBook, dec!(3480)),
            (3, Widget::ComicBook, dec!(285)),
            (4, Widget::QuickQuote, dec!(1428.57)),
            (6, Widget::ComicBook, dec!(1764)),
        ]
    );
    assert_eq!(report.skipped, 1);

    let rendered = app::render_batch(&report);
    assert!(rendered.ends_with("5 priced, 1 skipped\n"));
}

#[test]
fn batch_reports_unknown_widget_row() {
    let load = csv_loader::load_from_file(&fixture("batch.csv")).unwrap();

    assert_eq!(load.errors.len(), 1);
    assert!(matches!(
        &load.errors[0],
        CsvLoadError::UnknownWidget { widget, row: 5 } if widget == "posters"
    ));
}

// ── config ───────────────────────────────────────────────────────────────

#[test]
fn config_fixture_applies_overrides() {
    let config = AppConfig::load(&fixture("print-estimator.toml")).expect("fixture should load");
    let calculator = Arc::new(PriceCalculator::new(config.pricing_table().unwrap()));

    let childrens = app::price(calculator.clone(), Widget::ChildrensBook, RawSelection::new()).unwrap();
    // 3480 less the 10% tier from tiers.csv
    assert_eq!(childrens.breakdown.discount_fraction, dec!(0.10));
    assert_eq!(childrens.breakdown.total, dec!(3132));

    let comic = app::price(calculator, Widget::ComicBook, RawSelection::new()).unwrap();
    assert_eq!(comic.breakdown.option_cost("binding"), Some(dec!(10)));
    assert_eq!(comic.breakdown.total, dec!(295));

    assert_eq!(config.logging.level.as_deref(), Some("warn"));
    assert_eq!(config.quote_request.delay_ms, 5);
}

#[tokio::test]
async fn config_store_caps_sqlite_history() {
    let config = AppConfig::load(&fixture("print-estimator.toml")).unwrap();
    let repo = app::build_registry().create(&config.store).await.unwrap();
    let quote = app::price(default_calculator(), Widget::ComicBook, RawSelection::new()).unwrap();

    for _ in 0..4 {
        app::save(repo.as_ref(), &quote).await.unwrap();
    }

    assert_eq!(repo.count().await.unwrap(), 3);
}

// ── history ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn json_history_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = StoreConfig::new("json", dir.path().display().to_string());
    let repo = app::build_registry().create(&store).await.unwrap();

    let raw = RawSelection::new()
        .with(slots::UNIT_PRICE, "₹24.99")
        .with(slots::QUANTITY, "10");
    let quote = app::price(default_calculator(), Widget::QuickQuote, raw).unwrap();
    let saved = app::save(repo.as_ref(), &quote).await.unwrap();

    let listed = repo.list_quotes(None).await.unwrap();
    assert_eq!(listed, vec![saved.clone()]);
    assert_eq!(listed[0].currency, "INR");
    assert_eq!(listed[0].total, dec!(249.9));

    let rendered = app::render_history(&listed);
    assert!(rendered.contains(saved.quote_number.as_str()));
    assert!(rendered.contains("₹249.90"));
}

#[tokio::test]
async fn unknown_backend_is_a_configuration_error() {
    let store = StoreConfig::new("redis", "localhost");

    let result = app::build_registry().create(&store).await;

    assert!(matches!(
        result,
        Err(print_core::RepositoryError::Configuration(_))
    ));
}

// ── quote request ────────────────────────────────────────────────────────

#[tokio::test]
async fn request_attaches_latest_saved_quote() {
    let dir = tempfile::tempdir().unwrap();
    let store = StoreConfig::new("json", dir.path().display().to_string());
    let repo = app::build_registry().create(&store).await.unwrap();
    let quote = app::price(default_calculator(), Widget::ComicBook, RawSelection::new()).unwrap();
    app::save(repo.as_ref(), &quote).await.unwrap();
    let latest = app::save(repo.as_ref(), &quote).await.unwrap();

    let service = QuoteRequestService::simulated(Duration::from_millis(5), Duration::from_secs(5));
    let (_tx, rx) = cancellation();
    let receipt = app::request_quote(
        &service,
        repo.as_ref(),
        ContactForm::new("Asha Rao", "asha@example.in"),
        None,
        rx,
    )
    .await
    .unwrap();

    assert_eq!(receipt.reference, latest.quote_number);
}

#[tokio::test]
async fn request_with_bad_email_is_rejected_before_sending() {
    let dir = tempfile::tempdir().unwrap();
    let store = StoreConfig::new("json", dir.path().display().to_string());
    let repo = app::build_registry().create(&store).await.unwrap();

    let service = QuoteRequestService::simulated(Duration::from_secs(30), Duration::from_secs(60));
    let (_tx, rx) = cancellation();
    let err = app::request_quote(
        &service,
        repo.as_ref(),
        ContactForm::new("Asha Rao", "asha-at-example"),
        None,
        rx,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<QuoteRequestError>(),
        Some(QuoteRequestError::Validation(_))
    ));
}

#[tokio::test]
async fn request_for_missing_quote_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = StoreConfig::new("json", dir.path().display().to_string());
    let repo = app::build_registry().create(&store).await.unwrap();

    let service = QuoteRequestService::simulated(Duration::ZERO, Duration::from_secs(5));
    let (_tx, rx) = cancellation();
    let result = app::request_quote(
        &service,
        repo.as_ref(),
        ContactForm::new("Asha Rao", "asha@example.in"),
        Some(99),
        rx,
    )
    .await;

    assert!(result.is_err());
}
