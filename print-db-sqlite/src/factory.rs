use async_trait::async_trait;
use print_core::db::{RepositoryFactory, StoreConfig};
use print_core::{QuoteRepository, RepositoryError};
use tracing::info;

use crate::SqliteQuoteRepository;

/// Turns a store connection string into a sqlx URL. Bare paths are opened
/// read-write and created when missing.
fn database_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{trimmed}?mode=rwc")
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use print_core::db::RepositoryRegistry;
/// use print_db_sqlite::SqliteQuoteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteQuoteRepositoryFactory));
/// ```
pub struct SqliteQuoteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteQuoteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database named by `config.connection_string` and runs
    /// migrations.
    ///
    /// * A bare file path such as `"quotes.db"` is created if missing.
    /// * `":memory:"` opens a private in-memory database.
    /// * Anything starting with `sqlite:` is passed to sqlx as is.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let repo = match config.connection_string.trim() {
            ":memory:" | "sqlite::memory:" => SqliteQuoteRepository::in_memory().await,
            other => SqliteQuoteRepository::new(&database_url(other)).await,
        }
        .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?
        .with_history_cap(config.effective_cap());

        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(
            connection = %config.connection_string,
            cap = repo.history_cap(),
            "Opened SQLite quote history"
        );
        Ok(Box::new(repo))
    }
}
