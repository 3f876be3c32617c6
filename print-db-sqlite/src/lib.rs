mod factory;

pub use factory::SqliteQuoteRepositoryFactory;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use print_core::db::DEFAULT_HISTORY_CAP;
use print_core::{
    NewSavedQuote, OptionSelection, QuoteNumber, QuoteRepository, RepositoryError, SavedQuote,
    Widget,
};
use rust_decimal::Decimal;
use sqlx::FromRow;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

pub struct SqliteQuoteRepository {
    pool: SqlitePool,
    history_cap: usize,
}

impl SqliteQuoteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self::new_with_pool(pool))
    }

    /// A private in-memory database. The pool holds a single connection
    /// that never expires, since each SQLite connection would otherwise see
    /// its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;
        Ok(Self::new_with_pool(pool))
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }

    /// Sets how many quotes are kept. Zero is treated as one.
    pub fn with_history_cap(
        mut self,
        history_cap: usize,
    ) -> Self {
        self.history_cap = history_cap.max(1);
        self
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn evict_beyond_cap(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM saved_quotes
             WHERE id NOT IN (SELECT id FROM saved_quotes ORDER BY id DESC LIMIT ?)",
        )
        .bind(self.history_cap as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() > 0 {
            debug!(evicted = result.rows_affected(), cap = self.history_cap, "Trimmed quote history");
        }
        Ok(result.rows_affected())
    }
}

#[derive(FromRow)]
struct SavedQuoteRow {
    id: i64,
    quote_number: String,
    widget: String,
    selection: String,
    total: String,
    unit_price: String,
    currency: String,
    created_at: String,
}

impl TryFrom<SavedQuoteRow> for SavedQuote {
    type Error = RepositoryError;

    fn try_from(row: SavedQuoteRow) -> Result<Self, Self::Error> {
        let widget = Widget::parse(&row.widget).ok_or_else(|| {
            RepositoryError::Database(format!("Unknown widget '{}' on quote {}", row.widget, row.id))
        })?;
        let selection: OptionSelection = serde_json::from_str(&row.selection)?;

        Ok(SavedQuote {
            id: row.id,
            quote_number: QuoteNumber::from(row.quote_number),
            widget,
            selection,
            total: parse_decimal(&row.total)?,
            unit_price: parse_decimal(&row.unit_price)?,
            currency: row.currency,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

fn parse_decimal(s: &str) -> Result<Decimal, RepositoryError> {
    s.parse::<Decimal>()
        .map_err(|e| RepositoryError::Database(format!("Failed to parse decimal '{}': {}", s, e)))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|naive| naive.and_utc())
        })
        .map_err(|e| RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e)))
}

const SELECT_QUOTE: &str = "SELECT id, quote_number, widget, selection, total, unit_price,
        currency, created_at
 FROM saved_quotes";

#[async_trait]
impl QuoteRepository for SqliteQuoteRepository {
    async fn save_quote(
        &self,
        quote: NewSavedQuote,
    ) -> Result<SavedQuote, RepositoryError> {
        let created_at = Utc::now();
        let selection = serde_json::to_string(&quote.selection)?;

        let result = sqlx::query(
            "INSERT INTO saved_quotes (
                quote_number, widget, selection, total, unit_price, currency, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(quote.quote_number.as_str())
        .bind(quote.widget.as_str())
        .bind(&selection)
        .bind(quote.total.to_string())
        .bind(quote.unit_price.to_string())
        .bind(&quote.currency)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.evict_beyond_cap().await?;

        Ok(SavedQuote {
            id,
            quote_number: quote.quote_number,
            widget: quote.widget,
            selection: quote.selection,
            total: quote.total,
            unit_price: quote.unit_price,
            currency: quote.currency,
            created_at,
        })
    }

    async fn list_quotes(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<SavedQuote>, RepositoryError> {
        // SQLite reads a negative LIMIT as "no limit".
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let rows: Vec<SavedQuoteRow> =
            sqlx::query_as(&format!("{SELECT_QUOTE} ORDER BY id DESC LIMIT ?"))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.into_iter().map(SavedQuote::try_from).collect()
    }

    async fn get_quote(
        &self,
        id: i64,
    ) -> Result<SavedQuote, RepositoryError> {
        let row: SavedQuoteRow = sqlx::query_as(&format!("{SELECT_QUOTE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete_quote(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM saved_quotes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM saved_quotes")
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_quotes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(count as u64)
    }
}
