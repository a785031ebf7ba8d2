use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to a database backend
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Connection failed: {0}")]
    Failed(String),
    #[error("Connection timeout after {0:?}")]
    Timeout(Duration),
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),
    #[error("Driver not available: {0} (not compiled)")]
    DriverNotAvailable(&'static str),
    #[error("Database creation failed: {0}")]
    CreationFailed(String),
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, ConnectionError>;

/// Errors surfaced to callers of the configuration flow
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported database provider: {0}")]
    UnsupportedBackend(String),
    #[error("Invalid database configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Prompt failed: {0}")]
    Prompt(String),
    #[error("Connection validation failed: {0}")]
    ValidationFailed(String),
}
