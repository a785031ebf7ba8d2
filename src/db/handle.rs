use std::sync::Arc;
use std::time::Duration;

use super::connection::{ConnectionConfig, DatabaseType};
use super::driver::{open_with_timeout, OpenOptions, Session, Transport};
use super::error::{ConnectionError, Result};

/// Timeout for a full handle connect
pub const HANDLE_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A single live connection to a backend.
///
/// Created by a provider from one [`ConnectionConfig`] and never reused for a
/// different one. `disconnect` is always safe, connected or not.
pub struct DatabaseHandle {
    db_type: DatabaseType,
    config: ConnectionConfig,
    transport: Arc<dyn Transport>,
    session: Option<Box<dyn Session>>,
    connected: bool,
    probe_on_connect: bool,
}

impl DatabaseHandle {
    pub fn new(db_type: DatabaseType, config: ConnectionConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            db_type,
            config,
            transport,
            session: None,
            connected: false,
            probe_on_connect: false,
        }
    }

    /// Ping right after opening. Needed for clients that connect lazily.
    pub fn probe_on_connect(mut self, probe: bool) -> Self {
        self.probe_on_connect = probe;
        self
    }

    pub async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }

        let options = OpenOptions::new(HANDLE_CONNECT_TIMEOUT);
        let result = open_session(
            self.transport.as_ref(),
            &self.config,
            options,
            self.probe_on_connect,
        )
        .await;
        match result {
            Ok(session) => {
                self.session = Some(session);
                self.connected = true;
                tracing::info!(
                    backend = self.db_type.name(),
                    target = %self.config.target_label(self.db_type),
                    "Connected"
                );
                Ok(())
            }
            Err(e) => {
                self.connected = false;
                Err(ConnectionError::Failed(format!(
                    "Error connecting to {}: {}",
                    self.db_type.name(),
                    e
                )))
            }
        }
    }

    pub async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        if let Some(session) = self.session.take() {
            session.close().await?;
            tracing::debug!(backend = self.db_type.name(), "Disconnected");
        }
        Ok(())
    }

    /// Liveness check on the current connection
    pub async fn test_connection(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) => session.ping().await.is_ok(),
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Copy of the configuration this handle was built from
    pub fn config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}

async fn open_session(
    transport: &dyn Transport,
    config: &ConnectionConfig,
    options: OpenOptions,
    probe: bool,
) -> Result<Box<dyn Session>> {
    let mut session = open_with_timeout(transport, config, options).await?;
    if probe {
        if let Err(e) = session.ping().await {
            if let Err(close_err) = session.close().await {
                tracing::warn!(error = %close_err, "Failed to release connection after failed probe");
            }
            return Err(e);
        }
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{StubBehavior, StubTransport};

    fn handle_for(stub: &Arc<StubTransport>) -> DatabaseHandle {
        DatabaseHandle::new(
            DatabaseType::MySql,
            ConnectionConfig::relational("localhost", 3306, "root", "", "app_db"),
            stub.clone(),
        )
    }

    #[tokio::test]
    async fn connect_then_disconnect_toggles_state() {
        let stub = StubTransport::new(StubBehavior::default());
        let mut handle = handle_for(&stub);

        assert!(!handle.is_connected());
        handle.connect().await.unwrap();
        assert!(handle.is_connected());
        assert!(handle.test_connection().await);

        handle.disconnect().await.unwrap();
        assert!(!handle.is_connected());
        assert!(!handle.test_connection().await);
        assert_eq!(stub.counts().opens, 1);
        assert_eq!(stub.counts().closes, 1);
    }

    #[tokio::test]
    async fn disconnect_without_connect_is_safe() {
        let stub = StubTransport::new(StubBehavior::default());
        let mut handle = handle_for(&stub);

        handle.disconnect().await.unwrap();
        assert!(!handle.is_connected());
        assert_eq!(stub.counts().closes, 0);
    }

    #[tokio::test]
    async fn failed_connect_leaves_handle_disconnected() {
        let stub = StubTransport::new(StubBehavior {
            fail_open: true,
            ..StubBehavior::default()
        });
        let mut handle = handle_for(&stub);

        let err = handle.connect().await.unwrap_err();
        assert!(err.to_string().contains("Error connecting to MySQL"));
        assert!(!handle.is_connected());
    }

    #[tokio::test]
    async fn failed_probe_on_connect_releases_session() {
        let stub = StubTransport::new(StubBehavior {
            fail_ping: true,
            ..StubBehavior::default()
        });
        let mut handle = handle_for(&stub).probe_on_connect(true);

        assert!(handle.connect().await.is_err());
        assert!(!handle.is_connected());
        assert_eq!(stub.counts().closes, 1);

        handle.disconnect().await.unwrap();
        assert_eq!(stub.counts().closes, 1);
    }

    #[tokio::test]
    async fn config_readback_is_a_copy() {
        let stub = StubTransport::new(StubBehavior::default());
        let handle = handle_for(&stub);

        let mut copy = handle.config();
        copy.database = Some("other".into());
        assert_eq!(handle.config().database.as_deref(), Some("app_db"));
    }
}
