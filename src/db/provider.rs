use async_trait::async_trait;
use std::time::Duration;

use super::connection::{ConnectionConfig, DatabaseType};
use super::error::{ConnectionError, Result};
use super::handle::DatabaseHandle;

/// Timeout for the fast ping-only validation path
pub const FAST_VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for the create-if-missing validation path
pub const CREATE_VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Accelerated validation paths a provider offers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `check_connection_and_create_db` is implemented
    pub create_validation: bool,
    /// `validate_connection` is implemented
    pub fast_validation: bool,
}

/// Outcome of a successful create-if-missing check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseReadiness {
    Existing,
    Created,
}

/// Per-backend factory and validation logic.
///
/// Providers are stateless; every connection they open is closed before the
/// call returns.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    /// Conventional environment variable names for this backend's settings
    fn required_env_vars(&self) -> &'static [&'static str];

    /// Required env var names paired with the values from `config`
    fn env_assignments(&self, config: &ConnectionConfig) -> Vec<(&'static str, String)>;

    /// Structural check only, no network access
    fn validate_shape(&self, config: &ConnectionConfig) -> bool;

    fn create_handle(&self, config: ConnectionConfig) -> DatabaseHandle;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Short-lived connect and probe. Never fails, only reports `false`.
    async fn validate_connection(&self, config: &ConnectionConfig) -> bool {
        let _ = config;
        false
    }

    /// Connect to the server, creating the target database when it is absent
    async fn check_connection_and_create_db(
        &self,
        config: &ConnectionConfig,
    ) -> Result<DatabaseReadiness> {
        let _ = config;
        Err(ConnectionError::Unsupported("create-if-missing validation"))
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}
