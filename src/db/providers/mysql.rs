use async_trait::async_trait;
use std::sync::Arc;

use super::{probe_once, relational};
use crate::db::connection::{ConnectionConfig, DatabaseType};
use crate::db::driver::{default_transport, OpenOptions, Transport};
use crate::db::error::Result;
use crate::db::handle::DatabaseHandle;
use crate::db::provider::{
    Capabilities, DatabaseProvider, DatabaseReadiness, FAST_VALIDATION_TIMEOUT,
};

const ENV_VARS: &[&str] = &[
    "MYSQL_DB_HOST",
    "MYSQL_DB_USER",
    "MYSQL_DB_NAME",
    "MYSQL_DB_PASSWORD",
];

pub struct MySqlProvider {
    transport: Arc<dyn Transport>,
}

impl MySqlProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl Default for MySqlProvider {
    fn default() -> Self {
        Self::new(default_transport(DatabaseType::MySql))
    }
}

#[async_trait]
impl DatabaseProvider for MySqlProvider {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::MySql
    }

    fn required_env_vars(&self) -> &'static [&'static str] {
        ENV_VARS
    }

    fn env_assignments(&self, config: &ConnectionConfig) -> Vec<(&'static str, String)> {
        relational::env_values(ENV_VARS, config)
    }

    fn validate_shape(&self, config: &ConnectionConfig) -> bool {
        relational::validate_shape(config)
    }

    fn create_handle(&self, config: ConnectionConfig) -> DatabaseHandle {
        // MySQL connections are pinged once established
        DatabaseHandle::new(DatabaseType::MySql, config, self.transport.clone()).probe_on_connect(true)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            create_validation: true,
            fast_validation: true,
        }
    }

    async fn validate_connection(&self, config: &ConnectionConfig) -> bool {
        probe_once(
            self.transport.as_ref(),
            DatabaseType::MySql,
            config,
            OpenOptions::new(FAST_VALIDATION_TIMEOUT),
        )
        .await
    }

    async fn check_connection_and_create_db(
        &self,
        config: &ConnectionConfig,
    ) -> Result<DatabaseReadiness> {
        relational::ensure_database(self.transport.as_ref(), DatabaseType::MySql, config).await
    }
}
