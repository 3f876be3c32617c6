//! Quote history kept in a JSON file, one file per storage key.
//!
//! The file holds a JSON array of saved quotes, oldest first. Every change
//! rewrites the whole file through a temporary file in the same directory,
//! so readers never see a half-written history.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use print_core::db::{RepositoryFactory, STORAGE_KEY, StoreConfig};
use print_core::{NewSavedQuote, QuoteRepository, RepositoryError, SavedQuote};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct JsonFileQuoteRepository {
    path: PathBuf,
    history_cap: usize,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileQuoteRepository {
    /// Opens the history stored under [`STORAGE_KEY`] in `dir`, creating
    /// the directory if needed.
    pub fn open(
        dir: &Path,
        history_cap: usize,
    ) -> Result<Self, RepositoryError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            RepositoryError::Connection(format!("cannot create {}: {e}", dir.display()))
        })?;
        Ok(Self {
            path: dir.join(format!("{STORAGE_KEY}.json")),
            history_cap: history_cap.max(1),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored history. A missing file is an empty history, and so is a
    /// file that does not parse.
    fn read_all(&self) -> Result<Vec<SavedQuote>, RepositoryError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepositoryError::Database(e.to_string())),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&contents) {
            Ok(quotes) => Ok(quotes),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable quote history");
                Ok(Vec::new())
            }
        }
    }

    fn write_all(
        &self,
        quotes: &[SavedQuote],
    ) -> Result<(), RepositoryError> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        let json = serde_json::to_vec_pretty(quotes)?;

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| RepositoryError::Database(e.to_string()))?;
        tmp.write_all(&json)
            .and_then(|_| tmp.flush())
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| RepositoryError::Database(e.error.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl QuoteRepository for JsonFileQuoteRepository {
    async fn save_quote(
        &self,
        quote: NewSavedQuote,
    ) -> Result<SavedQuote, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut quotes = self.read_all()?;

        let id = quotes.iter().map(|q| q.id).max().unwrap_or(0) + 1;
        let saved = SavedQuote {
            id,
            quote_number: quote.quote_number,
            widget: quote.widget,
            selection: quote.selection,
            total: quote.total,
            unit_price: quote.unit_price,
            currency: quote.currency,
            created_at: Utc::now(),
        };
        quotes.push(saved.clone());

        if quotes.len() > self.history_cap {
            let excess = quotes.len() - self.history_cap;
            quotes.drain(..excess);
            debug!(evicted = excess, cap = self.history_cap, "Trimmed quote history");
        }

        self.write_all(&quotes)?;
        Ok(saved)
    }

    async fn list_quotes(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<SavedQuote>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let quotes = self.read_all()?;
        let limit = limit.unwrap_or(quotes.len());
        Ok(quotes.into_iter().rev().take(limit).collect())
    }

    async fn get_quote(
        &self,
        id: i64,
    ) -> Result<SavedQuote, RepositoryError> {
        let _guard = self.lock.lock().await;
        self.read_all()?
            .into_iter()
            .find(|q| q.id == id)
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_quote(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut quotes = self.read_all()?;
        let before = quotes.len();
        quotes.retain(|q| q.id != id);
        if quotes.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.write_all(&quotes)
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let _guard = self.lock.lock().await;
        let removed = self.read_all()?.len() as u64;
        self.write_all(&[])?;
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all()?.len() as u64)
    }
}

/// [`RepositoryFactory`] for the JSON file store. The connection string is
/// the directory that holds the history file.
pub struct JsonFileQuoteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for JsonFileQuoteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let dir = config.connection_string.trim();
        if dir.is_empty() {
            return Err(RepositoryError::Configuration(
                "json backend needs a directory".to_string(),
            ));
        }

        let repo = JsonFileQuoteRepository::open(Path::new(dir), config.effective_cap())?;
        info!(path = %repo.path().display(), cap = config.effective_cap(), "Opened JSON quote history");
        Ok(Box::new(repo))
    }
}
