//! PostgreSQL driver implementation

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

use crate::db::connection::{ConnectionConfig, DatabaseType};
use crate::db::driver::{OpenOptions, Session, Transport};
use crate::db::error::{ConnectionError, Result};

/// Maintenance database used when the target database is not selected
const MAINTENANCE_DB: &str = "postgres";

pub struct PostgresTransport;

#[async_trait]
impl Transport for PostgresTransport {
    async fn open(
        &self,
        config: &ConnectionConfig,
        options: OpenOptions,
    ) -> Result<Box<dyn Session>> {
        let mut pg = tokio_postgres::Config::new();
        pg.host(config.host.as_deref().unwrap_or_default())
            .port(config.effective_port(DatabaseType::PostgreSql))
            .user(config.user.as_deref().unwrap_or_default())
            .connect_timeout(options.timeout);
        if let Some(password) = config.password.as_deref() {
            pg.password(password);
        }
        let dbname = if options.select_database {
            config.database.as_deref().unwrap_or(MAINTENANCE_DB)
        } else {
            MAINTENANCE_DB
        };
        pg.dbname(dbname);

        let (client, connection) = tokio::time::timeout(options.timeout, pg.connect(NoTls))
            .await
            .map_err(|_| ConnectionError::Timeout(options.timeout))?
            .map_err(|e| ConnectionError::Failed(describe(&e)))?;

        // Spawn connection handler (required by tokio-postgres)
        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        Ok(Box::new(PostgresSession { client, connection }))
    }
}

struct PostgresSession {
    client: Client,
    connection: JoinHandle<()>,
}

/// Server errors carry their message in the `DbError`; client-side failures
/// keep the cause in the source chain, which `Display` leaves out.
fn describe(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => db.message().to_string(),
        None => with_sources(e),
    }
}

fn with_sources(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Double-quote an identifier, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl Session for PostgresSession {
    async fn ping(&mut self) -> Result<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| ConnectionError::Failed(describe(&e)))
    }

    async fn database_exists(&mut self, name: &str) -> Result<bool> {
        let row = self
            .client
            .query_opt("SELECT 1 FROM pg_database WHERE datname = $1", &[&name])
            .await
            .map_err(|e| ConnectionError::Failed(describe(&e)))?;
        Ok(row.is_some())
    }

    async fn create_database(&mut self, name: &str) -> Result<()> {
        self.client
            .batch_execute(&format!("CREATE DATABASE {}", quote_identifier(name)))
            .await
            .map_err(|e| ConnectionError::CreationFailed(describe(&e)))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let PostgresSession { client, connection } = *self;
        // Dropping the client ends the connection task
        drop(client);
        connection
            .await
            .map_err(|e| ConnectionError::Failed(e.to_string()))
    }
}
