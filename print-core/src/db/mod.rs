pub mod factory;
pub mod repository;

pub use factory::{DEFAULT_HISTORY_CAP, RepositoryFactory, RepositoryRegistry, StoreConfig};
pub use repository::{QuoteRepository, RepositoryError, STORAGE_KEY};
