//! MySQL driver implementation

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder};

use crate::db::connection::{ConnectionConfig, DatabaseType};
use crate::db::driver::{OpenOptions, Session, Transport};
use crate::db::error::{ConnectionError, Result};

pub struct MySqlTransport;

#[async_trait]
impl Transport for MySqlTransport {
    async fn open(
        &self,
        config: &ConnectionConfig,
        options: OpenOptions,
    ) -> Result<Box<dyn Session>> {
        let mut opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone().unwrap_or_default())
            .tcp_port(config.effective_port(DatabaseType::MySql))
            .user(config.user.clone())
            .pass(config.password.clone());
        if options.select_database {
            opts = opts.db_name(config.database.clone());
        }

        let conn = tokio::time::timeout(options.timeout, Conn::new(opts))
            .await
            .map_err(|_| ConnectionError::Timeout(options.timeout))?
            .map_err(|e| ConnectionError::Failed(e.to_string()))?;

        Ok(Box::new(MySqlSession { conn }))
    }
}

struct MySqlSession {
    conn: Conn,
}

/// Backtick-quote an identifier, doubling embedded backticks
fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[async_trait]
impl Session for MySqlSession {
    async fn ping(&mut self) -> Result<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| ConnectionError::Failed(e.to_string()))
    }

    async fn database_exists(&mut self, name: &str) -> Result<bool> {
        let row: Option<String> = self
            .conn
            .exec_first(
                "SELECT SCHEMA_NAME FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = ?",
                (name,),
            )
            .await
            .map_err(|e| ConnectionError::Failed(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn create_database(&mut self, name: &str) -> Result<()> {
        self.conn
            .query_drop(format!("CREATE DATABASE {}", quote_identifier(name)))
            .await
            .map_err(|e| ConnectionError::CreationFailed(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .disconnect()
            .await
            .map_err(|e| ConnectionError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers_with_backticks() {
        assert_eq!(quote_identifier("app_db"), "`app_db`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }
}
