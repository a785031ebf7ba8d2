use async_trait::async_trait;
use std::sync::Arc;

use super::probe_once;
use crate::db::connection::{ConnectionConfig, DatabaseType};
use crate::db::driver::{default_transport, OpenOptions, Transport};
use crate::db::handle::DatabaseHandle;
use crate::db::provider::{non_empty, Capabilities, DatabaseProvider, FAST_VALIDATION_TIMEOUT};

const ENV_VARS: &[&str] = &["MONGODB_URI"];

/// Document store provider. Schemaless, so it has no create-if-missing path.
pub struct MongoProvider {
    transport: Arc<dyn Transport>,
}

impl MongoProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl Default for MongoProvider {
    fn default() -> Self {
        Self::new(default_transport(DatabaseType::MongoDb))
    }
}

#[async_trait]
impl DatabaseProvider for MongoProvider {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MongoDb
    }

    fn required_env_vars(&self) -> &'static [&'static str] {
        ENV_VARS
    }

    fn env_assignments(&self, config: &ConnectionConfig) -> Vec<(&'static str, String)> {
        vec![("MONGODB_URI", config.url.clone().unwrap_or_default())]
    }

    fn validate_shape(&self, config: &ConnectionConfig) -> bool {
        non_empty(&config.url)
    }

    fn create_handle(&self, config: ConnectionConfig) -> DatabaseHandle {
        // The client is lazy, so connect has to ping to prove anything
        DatabaseHandle::new(DatabaseType::MongoDb, config, self.transport.clone()).probe_on_connect(true)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            create_validation: false,
            fast_validation: true,
        }
    }

    async fn validate_connection(&self, config: &ConnectionConfig) -> bool {
        probe_once(
            self.transport.as_ref(),
            DatabaseType::MongoDb,
            config,
            OpenOptions::new(FAST_VALIDATION_TIMEOUT),
        )
        .await
    }
}
