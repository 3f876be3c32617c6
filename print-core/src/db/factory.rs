use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::repository::{QuoteRepository, RepositoryError};

/// Entries kept in the quote history unless configured otherwise.
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Backend-agnostic store configuration.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `connection_string` is passed through to that
/// factory unchanged and means whatever the backend needs.
///
/// | backend  | connection_string examples                  |
/// |----------|---------------------------------------------|
/// | `json`   | `.print-estimator` (directory of key files) |
/// | `sqlite` | `quotes.db`, `:memory:`                     |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"json"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
    /// Most entries the history keeps. Zero is treated as one.
    pub history_cap: usize,
}

impl StoreConfig {
    pub fn new(
        backend: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            connection_string: connection_string.into(),
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }

    /// The cap, never below one.
    pub fn effective_cap(&self) -> usize {
        self.history_cap.max(1)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("json", ".print-estimator")
    }
}

/// One implementation per storage backend. Each backend exports a unit
/// struct implementing this trait, registered with a
/// [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Opens (or creates) the store and returns a ready repository.
    /// Implementations may run migrations or create directories here.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError>;
}

/// Registry of [`RepositoryFactory`] instances, keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a backend factory, replacing any with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatches to the factory matching `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no factory is registered
    ///   under the requested name.
    /// * Any error the chosen factory returns.
    pub async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{NewSavedQuote, SavedQuote};

    /// Reports the cap it was opened with as its count. Routing is all the
    /// registry tests look at.
    struct CapEcho(usize);

    #[async_trait]
    impl QuoteRepository for CapEcho {
        async fn save_quote(
            &self,
            _quote: NewSavedQuote,
        ) -> Result<SavedQuote, RepositoryError> {
            Err(RepositoryError::Database("read-only".to_string()))
        }

        async fn list_quotes(
            &self,
            _limit: Option<usize>,
        ) -> Result<Vec<SavedQuote>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn get_quote(
            &self,
            _id: i64,
        ) -> Result<SavedQuote, RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn delete_quote(
            &self,
            _id: i64,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn clear(&self) -> Result<u64, RepositoryError> {
            Ok(0)
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            Ok(self.0 as u64)
        }
    }

    /// Remembers every connection string it was asked to open.
    struct Recorder {
        name: &'static str,
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn boxed(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<Mutex<Vec<String>>>) {
            let opened = Arc::new(Mutex::new(Vec::new()));
            let factory = Recorder {
                name,
                opened: Arc::clone(&opened),
            };
            (Box::new(factory), opened)
        }
    }

    #[async_trait]
    impl RepositoryFactory for Recorder {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn create(
            &self,
            config: &StoreConfig,
        ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
            if config.connection_string.is_empty() {
                return Err(RepositoryError::Connection("nowhere to open".to_string()));
            }
            self.opened.lock().unwrap().push(config.connection_string.clone());
            Ok(Box::new(CapEcho(config.effective_cap())))
        }
    }

    // =========================================================================
    // StoreConfig tests
    // =========================================================================

    #[test]
    fn default_store_is_json_directory() {
        let cfg = StoreConfig::default();

        assert_eq!(cfg.backend, "json");
        assert_eq!(cfg.connection_string, ".print-estimator");
        assert_eq!(cfg.history_cap, DEFAULT_HISTORY_CAP);
    }

    #[test]
    fn effective_cap_never_below_one() {
        let mut cfg = StoreConfig::new("json", "quotes");
        cfg.history_cap = 0;
        assert_eq!(cfg.effective_cap(), 1);

        cfg.history_cap = 7;
        assert_eq!(cfg.effective_cap(), 7);
    }

    // =========================================================================
    // registry tests
    // =========================================================================

    #[test]
    fn backends_listed_alphabetically_without_duplicates() {
        let mut registry = RepositoryRegistry::default();
        assert!(registry.available_backends().is_empty());

        for name in ["sqlite", "json", "sqlite"] {
            registry.register(Recorder::boxed(name).0);
        }

        assert_eq!(registry.available_backends(), vec!["json", "sqlite"]);
    }

    #[tokio::test]
    async fn create_routes_by_backend_and_passes_cap() {
        let mut registry = RepositoryRegistry::new();
        let (json, json_opened) = Recorder::boxed("json");
        let (sqlite, sqlite_opened) = Recorder::boxed("sqlite");
        registry.register(json);
        registry.register(sqlite);

        let mut cfg = StoreConfig::new("sqlite", "quotes.db");
        cfg.history_cap = 12;
        let repo = registry.create(&cfg).await.unwrap();

        assert_eq!(repo.count().await, Ok(12));
        assert_eq!(*sqlite_opened.lock().unwrap(), vec!["quotes.db".to_string()]);
        assert!(json_opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_backend_lists_alternatives() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Recorder::boxed("json").0);

        let err = match registry.create(&StoreConfig::new("indexeddb", "x")).await {
            Err(err) => err,
            Ok(_) => panic!("expected an error for an unregistered backend"),
        };

        assert_eq!(
            err,
            RepositoryError::Configuration(
                "unknown backend 'indexeddb'; available: [\"json\"]".to_string()
            )
        );
    }

    #[tokio::test]
    async fn factory_errors_pass_through() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Recorder::boxed("json").0);

        let result = registry.create(&StoreConfig::new("json", "")).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Connection(msg)) if msg == "nowhere to open"
        ));
    }
}
