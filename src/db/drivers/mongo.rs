//! MongoDB driver implementation

use async_trait::async_trait;
use mongodb::{bson::doc, options::ClientOptions, Client};

use crate::db::connection::ConnectionConfig;
use crate::db::driver::{OpenOptions, Session, Transport};
use crate::db::error::{ConnectionError, Result};

pub struct MongoTransport;

#[async_trait]
impl Transport for MongoTransport {
    async fn open(
        &self,
        config: &ConnectionConfig,
        options: OpenOptions,
    ) -> Result<Box<dyn Session>> {
        let conn_str = config.url.as_deref().unwrap_or_default();
        if !conn_str.starts_with("mongodb://") && !conn_str.starts_with("mongodb+srv://") {
            return Err(ConnectionError::InvalidConnectionString(
                "MongoDB connection string must start with mongodb:// or mongodb+srv://".into(),
            ));
        }

        // Parsing may resolve SRV records, so it shares the timeout
        let mut client_options = tokio::time::timeout(options.timeout, ClientOptions::parse(conn_str))
            .await
            .map_err(|_| ConnectionError::Timeout(options.timeout))?
            .map_err(|e| ConnectionError::InvalidConnectionString(e.to_string()))?;

        client_options.connect_timeout = Some(options.timeout);
        client_options.server_selection_timeout = Some(options.timeout);

        // The client connects lazily; the first command performs the handshake
        let client =
            Client::with_options(client_options).map_err(|e| ConnectionError::Failed(e.to_string()))?;

        Ok(Box::new(MongoSession { client }))
    }
}

struct MongoSession {
    client: Client,
}

#[async_trait]
impl Session for MongoSession {
    async fn ping(&mut self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| ConnectionError::Failed(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client.shutdown().await;
        Ok(())
    }
}
