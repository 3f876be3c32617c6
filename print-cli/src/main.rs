use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use print_core::models::Widget;
use print_core::resolver::RawSelection;
use print_core::{PriceCalculator, QuoteRepository};
use print_data::SiteCatalog;
use tracing::{debug, info};

use print_cli::app::{self, parse_assignment};
use print_cli::config::AppConfig;
use print_cli::csv_loader;
use print_cli::forms::ContactForm;
use print_cli::logging::{self, LogSettings};
use print_cli::quote_request::{QuoteRequestService, cancellation};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Price estimates for the print shop's products.
///
/// Selections are given as `--set slot=value` pairs using the same slot
/// names as the storefront controls. Anything not set uses the widget's
/// default.
#[derive(Debug, Parser)]
#[command(name = "print-estimator", version, about)]
struct Cli {
    /// Config file. Defaults to $PRINT_ESTIMATOR_CONFIG, then
    /// ./print-estimator.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or EnvFilter directive, overriding the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Hide log output on stderr.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// History backend (`json` or `sqlite`), overriding the config file.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// History location: a directory for `json`, a database file for
    /// `sqlite`.
    #[arg(long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Business cards, brochures, folders, reports, posters, banners.
    Generic(QuoteArgs),
    /// Children's books.
    #[command(alias = "childrens-book")]
    Childrens(QuoteArgs),
    /// Comic books, priced in USD.
    #[command(alias = "comic-book")]
    Comic(QuoteArgs),
    /// Quick quote from a catalog unit price.
    #[command(alias = "quick-quote")]
    Quick(QuoteArgs),
    /// Price every row of a CSV file.
    Batch {
        path: PathBuf,
        /// Save every priced row to the history.
        #[arg(long)]
        save: bool,
    },
    /// Saved quote history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Featured products, testimonials and blog posts.
    Catalog {
        #[arg(long, default_value = "products.json")]
        path: PathBuf,
    },
    /// Ask the shop to follow up on a saved quote.
    Request(RequestArgs),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// A selection as slot=value, e.g. `--set paper-type=premium`.
    #[arg(long = "set", value_name = "SLOT=VALUE", value_parser = parse_assignment)]
    assignments: Vec<(String, String)>,

    /// Save the quote to the history.
    #[arg(long)]
    save: bool,

    /// Print the breakdown as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    Clear,
}

#[derive(Debug, Args)]
struct RequestArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    message: Option<String>,
    /// Saved quote to attach. Defaults to the most recent one.
    #[arg(long)]
    quote_id: Option<i64>,
    /// Give up after this long, overriding the config file.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::discover(cli.config.as_deref())?;

    logging::init_logging(&LogSettings {
        override_level: cli.log_level.clone(),
        configured_level: config.logging.level.clone(),
        file: cli.log_file.clone().or_else(|| config.logging.file.clone()),
        quiet: cli.quiet,
    })?;

    if let Some(backend) = cli.backend {
        config.store.backend = backend;
    }
    if let Some(store) = cli.store {
        config.store.connection_string = store;
    }

    let calculator = Arc::new(PriceCalculator::new(
        config
            .pricing_table()
            .context("Failed to load pricing overrides")?,
    ));

    run(cli.command, &config, calculator).await
}

async fn open_history(config: &AppConfig) -> Result<Box<dyn QuoteRepository>> {
    debug!(backend = %config.store.backend, "Opening quote history");
    let registry = app::build_registry();
    registry
        .create(&config.store)
        .await
        .with_context(|| format!("Failed to open {} quote history", config.store.backend))
}

async fn run(
    command: Command,
    config: &AppConfig,
    calculator: Arc<PriceCalculator>,
) -> Result<()> {
    match command {
        Command::Generic(args) => quote(Widget::Generic, args, config, calculator).await,
        Command::Childrens(args) => quote(Widget::ChildrensBook, args, config, calculator).await,
        Command::Comic(args) => quote(Widget::ComicBook, args, config, calculator).await,
        Command::Quick(args) => quote(Widget::QuickQuote, args, config, calculator).await,
        Command::Batch { path, save } => {
            let load = csv_loader::load_from_file(&path)
                .with_context(|| format!("Failed to load batch file {}", path.display()))?;
            let report = app::price_batch(calculator, load);
            print!("{}", app::render_batch(&report));

            if save && !report.priced.is_empty() {
                let repo = open_history(config).await?;
                for (_, priced) in &report.priced {
                    app::save(repo.as_ref(), priced).await?;
                }
            }
            Ok(())
        }
        Command::History { action } => {
            let repo = open_history(config).await?;
            match action {
                HistoryAction::List { limit } => {
                    let quotes = repo.list_quotes(limit).await?;
                    print!("{}", app::render_history(&quotes));
                }
                HistoryAction::Clear => {
                    let removed = repo.clear().await?;
                    println!("Removed {removed} saved quotes.");
                }
            }
            Ok(())
        }
        Command::Catalog { path } => {
            let catalog = SiteCatalog::load_or_fallback(&path);
            print!("{}", app::render_catalog(&catalog));
            Ok(())
        }
        Command::Request(args) => request(args, config).await,
    }
}

async fn quote(
    widget: Widget,
    args: QuoteArgs,
    config: &AppConfig,
    calculator: Arc<PriceCalculator>,
) -> Result<()> {
    let raw: RawSelection = args.assignments.into_iter().collect();
    let priced = app::price(calculator, widget, raw)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&priced.breakdown)?);
    } else {
        print!("{}", priced.display());
    }

    if args.save {
        let repo = open_history(config).await?;
        let saved = app::save(repo.as_ref(), &priced).await?;
        println!("Saved as {} (#{})", saved.quote_number, saved.id);
    }
    Ok(())
}

async fn request(
    args: RequestArgs,
    config: &AppConfig,
) -> Result<()> {
    let repo = open_history(config).await?;
    let timeout = Duration::from_millis(args.timeout_ms.unwrap_or(config.quote_request.timeout_ms));
    let service = QuoteRequestService::simulated(
        Duration::from_millis(config.quote_request.delay_ms),
        timeout,
    );

    let contact = ContactForm {
        name: args.name,
        email: args.email,
        phone: args.phone,
        message: args.message,
    };

    let (cancel_tx, cancel_rx) = cancellation();
    let watcher = tokio::spawn(async move {
        let interrupted = tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")
            .map(|()| {
                info!("Interrupted, cancelling quote request");
                let _ = cancel_tx.send(true);
            });
        logging::log_task_error("ctrl-c watcher", interrupted);
    });

    println!("Sending...");
    let result = app::request_quote(&service, repo.as_ref(), contact, args.quote_id, cancel_rx).await;
    watcher.abort();

    let receipt = result?;
    println!("{} (reference {})", receipt.message, receipt.reference);
    Ok(())
}
