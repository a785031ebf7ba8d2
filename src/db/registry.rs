//! Provider registry
//!
//! Fixed, ordered mapping from backend id to provider.

use std::sync::Arc;

use super::connection::DatabaseType;
use super::provider::DatabaseProvider;
use super::providers::{MongoProvider, MySqlProvider, PostgresProvider};

/// Read-only once built; registration order is the display order
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn DatabaseProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// MySQL, PostgreSQL and MongoDB with their compiled transports
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Arc::new(MySqlProvider::default()))
            .register(Arc::new(PostgresProvider::default()))
            .register(Arc::new(MongoProvider::default()))
    }

    /// Register a provider. A provider for an already registered backend
    /// replaces the earlier one in place.
    pub fn register(mut self, provider: Arc<dyn DatabaseProvider>) -> Self {
        let db_type = provider.database_type();
        match self
            .providers
            .iter_mut()
            .find(|p| p.database_type() == db_type)
        {
            Some(slot) => *slot = provider,
            None => self.providers.push(provider),
        }
        tracing::debug!(backend = db_type.id(), "Registered provider");
        self
    }

    /// Look up a provider by backend id
    pub fn get(&self, id: &str) -> Option<Arc<dyn DatabaseProvider>> {
        let db_type: DatabaseType = id.parse().ok()?;
        self.providers
            .iter()
            .find(|p| p.database_type() == db_type)
            .cloned()
    }

    /// Ids of all registered backends
    pub fn supported(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .map(|p| p.database_type().id())
            .collect()
    }

    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn DatabaseProvider>> {
        self.providers.iter()
    }
}
