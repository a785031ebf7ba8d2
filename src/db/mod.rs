pub mod connection;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod handle;
pub mod provider;
pub mod providers;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{ConnectionConfig, DatabaseType, ParameterShape};
pub use error::{ConfigError, ConnectionError};
pub use handle::DatabaseHandle;
pub use provider::{Capabilities, DatabaseProvider, DatabaseReadiness};
pub use registry::ProviderRegistry;
