//! Backend providers: MySQL, PostgreSQL and MongoDB

mod mongo;
mod mysql;
mod postgres;
mod relational;

pub use mongo::MongoProvider;
pub use mysql::MySqlProvider;
pub use postgres::PostgresProvider;

use super::connection::{ConnectionConfig, DatabaseType};
use super::driver::{open_with_timeout, OpenOptions, Session, Transport};

/// Open, ping, close. Every failure collapses to `false`.
pub(crate) async fn probe_once(
    transport: &dyn Transport,
    db_type: DatabaseType,
    config: &ConnectionConfig,
    options: OpenOptions,
) -> bool {
    let mut session = match open_with_timeout(transport, config, options).await {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!(backend = db_type.name(), error = %e, "Connection attempt failed");
            return false;
        }
    };

    let probe = session.ping().await;
    release(session, db_type).await;

    match probe {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(backend = db_type.name(), error = %e, "Liveness probe failed");
            false
        }
    }
}

/// Close a session, logging rather than propagating release errors
pub(crate) async fn release(session: Box<dyn Session>, db_type: DatabaseType) {
    if let Err(e) = session.close().await {
        tracing::warn!(backend = db_type.name(), error = %e, "Failed to close connection");
    }
}
