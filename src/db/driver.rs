use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::connection::{ConnectionConfig, DatabaseType};
use super::error::{ConnectionError, Result};

/// Options for a single transport open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub timeout: Duration,
    /// Whether to select `config.database` on connect. The create-if-missing
    /// path connects to the server alone because the database may not exist.
    pub select_database: bool,
}

impl OpenOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            select_database: true,
        }
    }

    pub fn server_only(mut self) -> Self {
        self.select_database = false;
        self
    }
}

/// Wire-level client for one backend.
///
/// Only opens sessions; everything else happens on the returned [`Session`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(
        &self,
        config: &ConnectionConfig,
        options: OpenOptions,
    ) -> Result<Box<dyn Session>>;
}

/// One live connection opened by a [`Transport`]
#[async_trait]
pub trait Session: Send {
    /// Minimal liveness probe
    async fn ping(&mut self) -> Result<()>;

    /// Catalog lookup for a named database
    /// Document stores have no catalog and keep the default
    async fn database_exists(&mut self, name: &str) -> Result<bool> {
        let _ = name;
        Err(ConnectionError::Unsupported("catalog query"))
    }

    async fn create_database(&mut self, name: &str) -> Result<()> {
        let _ = name;
        Err(ConnectionError::Unsupported("create database"))
    }

    /// Release the underlying connection
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Stand-in for backends whose driver feature was not compiled
pub struct UnavailableTransport(pub DatabaseType);

#[async_trait]
impl Transport for UnavailableTransport {
    async fn open(
        &self,
        _config: &ConnectionConfig,
        _options: OpenOptions,
    ) -> Result<Box<dyn Session>> {
        Err(ConnectionError::DriverNotAvailable(self.0.feature_name()))
    }
}

/// Factory function - the compiled transport for a backend, or a stand-in that
/// reports the driver as unavailable
pub fn default_transport(db_type: DatabaseType) -> Arc<dyn Transport> {
    match db_type {
        #[cfg(feature = "mysql")]
        DatabaseType::MySql => Arc::new(super::drivers::mysql::MySqlTransport),

        #[cfg(feature = "postgres")]
        DatabaseType::PostgreSql => Arc::new(super::drivers::postgres::PostgresTransport),

        #[cfg(feature = "mongodb")]
        DatabaseType::MongoDb => Arc::new(super::drivers::mongo::MongoTransport),

        // Fallback for when feature not compiled
        #[allow(unreachable_patterns)]
        other => Arc::new(UnavailableTransport(other)),
    }
}

/// Open a session, bounding the attempt by `options.timeout`
pub async fn open_with_timeout(
    transport: &dyn Transport,
    config: &ConnectionConfig,
    options: OpenOptions,
) -> Result<Box<dyn Session>> {
    tokio::time::timeout(options.timeout, transport.open(config, options))
        .await
        .map_err(|_| ConnectionError::Timeout(options.timeout))?
}
