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
    "POSTGRES_DB_HOST",
    "POSTGRES_DB_USER",
    "POSTGRES_DB_NAME",
    "POSTGRES_DB_PASSWORD",
];

pub struct PostgresProvider {
    transport: Arc<dyn Transport>,
}

impl PostgresProvider {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl Default for PostgresProvider {
    fn default() -> Self {
        Self::new(default_transport(DatabaseType::PostgreSql))
    }
}

#[async_trait]
impl DatabaseProvider for PostgresProvider {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::PostgreSql
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
        DatabaseHandle::new(DatabaseType::PostgreSql, config, self.transport.clone())
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
            DatabaseType::PostgreSql,
            config,
            OpenOptions::new(FAST_VALIDATION_TIMEOUT),
        )
        .await
    }

    async fn check_connection_and_create_db(
        &self,
        config: &ConnectionConfig,
    ) -> Result<DatabaseReadiness> {
        relational::ensure_database(self.transport.as_ref(), DatabaseType::PostgreSql, config)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::provider::CREATE_VALIDATION_TIMEOUT;
    use crate::db::testing::{StubBehavior, StubTransport};

    #[tokio::test]
    async fn handle_connect_does_not_ping() {
        let stub = StubTransport::new(StubBehavior::default());
        let provider = PostgresProvider::new(stub.clone());

        let mut handle =
            provider.create_handle(ConnectionConfig::relational("localhost", 5432, "postgres", "", "app_db"));
        handle.connect().await.unwrap();
        handle.disconnect().await.unwrap();

        assert_eq!(stub.counts().pings, 0);
        assert_eq!(stub.counts().closes, 1);
    }

    #[tokio::test]
    async fn creates_missing_database_from_maintenance_connection() {
        let stub = StubTransport::new(StubBehavior::default());
        let provider = PostgresProvider::new(stub.clone());

        let readiness = provider
            .check_connection_and_create_db(&ConnectionConfig::relational(
                "localhost", 5432, "postgres", "secret", "app_db",
            ))
            .await
            .unwrap();

        assert_eq!(readiness, DatabaseReadiness::Created);
        let counts = stub.counts();
        assert_eq!(counts.exists_queries, 1);
        assert_eq!(counts.creates, 1);
        assert_eq!(counts.closes, 1);

        let opened = stub.opened_with();
        assert_eq!(opened.len(), 1);
        assert!(!opened[0].select_database);
        assert_eq!(opened[0].timeout, CREATE_VALIDATION_TIMEOUT);
    }

    #[tokio::test]
    async fn existing_database_is_not_recreated() {
        let stub = StubTransport::new(StubBehavior {
            database_present: true,
            ..StubBehavior::default()
        });
        let provider = PostgresProvider::new(stub.clone());

        let readiness = provider
            .check_connection_and_create_db(&ConnectionConfig::relational(
                "localhost", 5432, "postgres", "", "app_db",
            ))
            .await
            .unwrap();

        assert_eq!(readiness, DatabaseReadiness::Existing);
        assert_eq!(stub.counts().creates, 0);
        assert_eq!(stub.counts().closes, 1);
    }

    #[tokio::test]
    async fn connect_failure_surfaces_transport_message() {
        let stub = StubTransport::new(StubBehavior {
            fail_open: true,
            ..StubBehavior::default()
        });
        let provider = PostgresProvider::new(stub.clone());

        let err = provider
            .check_connection_and_create_db(&ConnectionConfig::relational(
                "localhost", 5432, "postgres", "", "app_db",
            ))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("ECONNREFUSED"));
        assert_eq!(stub.counts().closes, 0);
    }

    #[tokio::test]
    async fn missing_database_name_fails_without_connecting() {
        let stub = StubTransport::new(StubBehavior::default());
        let provider = PostgresProvider::new(stub.clone());

        let config = ConnectionConfig {
            host: Some("localhost".into()),
            user: Some("postgres".into()),
            ..ConnectionConfig::default()
        };
        assert!(provider.check_connection_and_create_db(&config).await.is_err());
        assert_eq!(stub.counts().opens, 0);
    }

    #[test]
    fn declares_both_accelerated_paths() {
        let provider = PostgresProvider::new(StubTransport::new(StubBehavior::default()));
        let caps = provider.capabilities();
        assert!(caps.create_validation);
        assert!(caps.fast_validation);
        assert_eq!(provider.required_env_vars()[0], "POSTGRES_DB_HOST");
    }
}
