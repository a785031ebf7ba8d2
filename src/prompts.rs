//! Interactive collection of connection parameters.
//!
//! The orchestrator only sees the [`Prompter`] trait; answers are raw,
//! untrusted strings that still have to pass shape validation.

use async_trait::async_trait;
use dialoguer::{Input, Password, Select};
use std::io::IsTerminal;

use crate::db::connection::DatabaseType;
use crate::db::error::ConfigError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_DATABASE: &str = "app_db";
pub const DEFAULT_MONGODB_URL: &str = "mongodb://localhost:27017/app_db";

/// Raw answers for a relational backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationalAnswers {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Raw answer for a document store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentAnswers {
    pub url: String,
}

/// Source of connection parameters. May be called again after a failed
/// validation.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// host / port / user / password / database, port defaulting per backend
    async fn relational(&self, db_type: DatabaseType) -> Result<RelationalAnswers, ConfigError>;

    async fn document(&self, db_type: DatabaseType) -> Result<DocumentAnswers, ConfigError>;
}

/// Terminal prompts backed by `dialoguer`
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompter {
    default_database: Option<String>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the suggested database name
    pub fn with_default_database(mut self, name: impl Into<String>) -> Self {
        self.default_database = Some(name.into());
        self
    }
}

/// Checks if both stdin and stdout are connected to a terminal.
pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

fn require_interactive() -> Result<(), ConfigError> {
    if !is_interactive_terminal() {
        return Err(ConfigError::Prompt(
            "interactive configuration requires a terminal".into(),
        ));
    }
    Ok(())
}

fn prompt_error(e: dialoguer::Error) -> ConfigError {
    ConfigError::Prompt(e.to_string())
}

fn input(prompt: &str, default: String) -> Result<String, ConfigError> {
    Input::<String>::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()
        .map_err(prompt_error)
}

/// dialoguer blocks on stdin, so it runs off the async workers
async fn blocking<T, F>(f: F) -> Result<T, ConfigError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ConfigError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ConfigError::Prompt(e.to_string()))?
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn relational(&self, db_type: DatabaseType) -> Result<RelationalAnswers, ConfigError> {
        require_interactive()?;
        let default_database = self
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        blocking(move || {
            Ok(RelationalAnswers {
                host: input("Database host", DEFAULT_HOST.to_string())?,
                port: input("Port", db_type.default_port().to_string())?,
                user: input("Username", DEFAULT_USER.to_string())?,
                password: Password::new()
                    .with_prompt("Password")
                    .allow_empty_password(true)
                    .interact()
                    .map_err(prompt_error)?,
                database: input("Database name", default_database)?,
            })
        })
        .await
    }

    async fn document(&self, db_type: DatabaseType) -> Result<DocumentAnswers, ConfigError> {
        require_interactive()?;
        let default_url = match &self.default_database {
            Some(name) => format!("mongodb://localhost:{}/{}", db_type.default_port(), name),
            None => DEFAULT_MONGODB_URL.to_string(),
        };
        let prompt = format!("{} connection URL", db_type.name());

        blocking(move || {
            Ok(DocumentAnswers {
                url: input(&prompt, default_url)?,
            })
        })
        .await
    }
}

/// Ask the user to pick one of `ids`; returns the chosen id
pub async fn select_backend(ids: Vec<&'static str>) -> Result<&'static str, ConfigError> {
    require_interactive()?;
    if ids.is_empty() {
        return Err(ConfigError::UnsupportedBackend("no backends registered".into()));
    }
    blocking(move || {
        let index = Select::new()
            .with_prompt("Database type")
            .items(&ids)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(ids[index])
    })
    .await
}
