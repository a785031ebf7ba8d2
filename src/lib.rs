//! Configure and validate a connection to MySQL, PostgreSQL or MongoDB.
//!
//! [`ConfigService`] collects parameters through a [`prompts::Prompter`],
//! checks their shape with the backend's [`db::DatabaseProvider`], and then
//! proves a usable database is reachable: creating it when missing on SQL
//! backends, pinging it otherwise. Successful validations are cached for
//! five minutes.

pub mod db;
pub mod prompts;
pub mod service;

pub use db::{ConfigError, ConnectionConfig, ConnectionError, DatabaseType, ProviderRegistry};
pub use service::{ConfigService, ValidationReport, ValidationSource};
