use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a backend expects its connection parameters to be supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterShape {
    /// host / port / user / password / database
    Relational,
    /// A single connection URL
    Document,
}

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    MySql,
    PostgreSql,
    MongoDb,
}

impl DatabaseType {
    /// Stable identifier used for lookups and cache keys
    pub fn id(&self) -> &'static str {
        match self {
            DatabaseType::MySql => "mysql",
            DatabaseType::PostgreSql => "postgresql",
            DatabaseType::MongoDb => "mongodb",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DatabaseType::MySql => "MySQL",
            DatabaseType::PostgreSql => "PostgreSQL",
            DatabaseType::MongoDb => "MongoDB",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseType::MySql => 3306,
            DatabaseType::PostgreSql => 5432,
            DatabaseType::MongoDb => 27017,
        }
    }

    pub fn shape(&self) -> ParameterShape {
        match self {
            DatabaseType::MySql | DatabaseType::PostgreSql => ParameterShape::Relational,
            DatabaseType::MongoDb => ParameterShape::Document,
        }
    }

    /// Cargo feature that compiles the transport for this backend
    pub fn feature_name(&self) -> &'static str {
        match self {
            DatabaseType::MySql => "mysql",
            DatabaseType::PostgreSql => "postgres",
            DatabaseType::MongoDb => "mongodb",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(DatabaseType::MySql),
            "postgresql" | "postgres" => Ok(DatabaseType::PostgreSql),
            "mongodb" => Ok(DatabaseType::MongoDb),
            other => Err(other.to_string()),
        }
    }
}

/// Connection parameters for a single backend target.
///
/// Which fields are required depends on the backend: relational engines use
/// `host`/`port`/`user`/`password`/`database`, the document store uses `url`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ConnectionConfig {
    pub fn relational(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            user: Some(user.into()),
            password: Some(password.into()),
            database: Some(database.into()),
            url: None,
        }
    }

    pub fn document(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Explicit port, or the backend default when none was given
    pub fn effective_port(&self, db_type: DatabaseType) -> u16 {
        self.port.unwrap_or_else(|| db_type.default_port())
    }

    /// Secret-free description of the target, safe for logs
    pub fn target_label(&self, db_type: DatabaseType) -> String {
        match db_type.shape() {
            ParameterShape::Relational => format!(
                "{}:{}/{}",
                self.host.as_deref().unwrap_or_default(),
                self.effective_port(db_type),
                self.database.as_deref().unwrap_or_default()
            ),
            ParameterShape::Document => mask_url(self.url.as_deref().unwrap_or_default()),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("url", &self.url.as_deref().map(mask_url))
            .finish()
    }
}

/// Replace the password component of a URL with `***`.
///
/// Unparseable input is masked entirely rather than echoed back.
pub fn mask_url(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() && parsed.set_password(Some("***")).is_err() {
                return "***".to_string();
            }
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
