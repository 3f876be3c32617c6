use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewSavedQuote, SavedQuote};

/// Key the storefront kept its calculation history under.
pub const STORAGE_KEY: &str = "shristiPressCalculations";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Capped history of saved quotes.
///
/// Implementations keep at most their configured history cap. Saving past
/// the cap drops the oldest entries first.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Appends a quote and returns it with its assigned id and timestamp.
    async fn save_quote(
        &self,
        quote: NewSavedQuote,
    ) -> Result<SavedQuote, RepositoryError>;

    /// Newest first. `None` lists the whole history.
    async fn list_quotes(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<SavedQuote>, RepositoryError>;

    async fn get_quote(
        &self,
        id: i64,
    ) -> Result<SavedQuote, RepositoryError>;

    async fn delete_quote(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    /// Removes every entry, returning how many were removed.
    async fn clear(&self) -> Result<u64, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;
}
