//! Behaviour shared by the SQL providers

use super::release;
use crate::db::connection::{ConnectionConfig, DatabaseType};
use crate::db::driver::{open_with_timeout, OpenOptions, Session, Transport};
use crate::db::error::{ConnectionError, Result};
use crate::db::provider::{non_empty, DatabaseReadiness, CREATE_VALIDATION_TIMEOUT};

/// host, user and database must all be present and non-empty
pub(super) fn validate_shape(config: &ConnectionConfig) -> bool {
    non_empty(&config.host) && non_empty(&config.user) && non_empty(&config.database)
}

/// Values for `<PREFIX>_DB_HOST`, `_USER`, `_NAME`, `_PASSWORD`, in that order
pub(super) fn env_values(
    names: &'static [&'static str],
    config: &ConnectionConfig,
) -> Vec<(&'static str, String)> {
    let values = [
        config.host.clone().unwrap_or_default(),
        config.user.clone().unwrap_or_default(),
        config.database.clone().unwrap_or_default(),
        config.password.clone().unwrap_or_default(),
    ];
    names.iter().copied().zip(values).collect()
}

/// Connect to the server without selecting a database, then make sure the
/// configured database exists. The session is closed on every path.
pub(super) async fn ensure_database(
    transport: &dyn Transport,
    db_type: DatabaseType,
    config: &ConnectionConfig,
) -> Result<DatabaseReadiness> {
    let name = config
        .database
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ConnectionError::Failed("no database name configured".into()))?;

    let options = OpenOptions::new(CREATE_VALIDATION_TIMEOUT).server_only();
    let mut session = open_with_timeout(transport, config, options).await?;
    let result = ensure_on_session(session.as_mut(), name).await;
    release(session, db_type).await;

    match &result {
        Ok(DatabaseReadiness::Created) => {
            tracing::info!(backend = db_type.name(), database = name, "Database created");
        }
        Ok(DatabaseReadiness::Existing) => {
            tracing::debug!(backend = db_type.name(), database = name, "Database already exists");
        }
        Err(e) => {
            tracing::debug!(backend = db_type.name(), database = name, error = %e, "Create-if-missing check failed");
        }
    }
    result
}

async fn ensure_on_session(session: &mut dyn Session, name: &str) -> Result<DatabaseReadiness> {
    session.ping().await?;
    if session.database_exists(name).await? {
        return Ok(DatabaseReadiness::Existing);
    }
    session.create_database(name).await.map_err(|e| match e {
        ConnectionError::CreationFailed(msg) => ConnectionError::CreationFailed(msg),
        other => ConnectionError::CreationFailed(other.to_string()),
    })?;
    Ok(DatabaseReadiness::Created)
}
