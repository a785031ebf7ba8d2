//! Configuration orchestrator: collect, shape-check, validate, cache.

pub mod cache;

use std::sync::Arc;

use crate::db::connection::{ConnectionConfig, DatabaseType, ParameterShape};
use crate::db::error::ConfigError;
use crate::db::provider::{DatabaseProvider, DatabaseReadiness};
use crate::db::registry::ProviderRegistry;
use crate::prompts::{DocumentAnswers, Prompter, RelationalAnswers};

pub use cache::{ValidationCache, CACHE_TTL};

/// Which tier decided a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSource {
    Cache,
    CreateIfMissing,
    Fast,
    Handle,
    /// No provider registered for the backend
    Unsupported,
}

/// Outcome of a connection validation. Failures carry a human readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub source: ValidationSource,
    pub message: Option<String>,
}

impl ValidationReport {
    fn success(source: ValidationSource) -> Self {
        Self {
            valid: true,
            source,
            message: None,
        }
    }

    fn failure(source: ValidationSource, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            source,
            message: Some(message.into()),
        }
    }
}

/// Drives the configure → validate flow for every registered backend
pub struct ConfigService {
    registry: ProviderRegistry,
    cache: ValidationCache,
    prompter: Box<dyn Prompter>,
}

impl ConfigService {
    pub fn new(registry: ProviderRegistry, prompter: Box<dyn Prompter>) -> Self {
        Self::with_cache(registry, prompter, ValidationCache::new())
    }

    pub fn with_cache(
        registry: ProviderRegistry,
        prompter: Box<dyn Prompter>,
        cache: ValidationCache,
    ) -> Self {
        Self {
            registry,
            cache,
            prompter,
        }
    }

    pub fn get_provider(&self, id: &str) -> Option<Arc<dyn DatabaseProvider>> {
        self.registry.get(id)
    }

    pub fn supported_backends(&self) -> Vec<&'static str> {
        self.registry.supported()
    }

    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Collect parameters for `id` and check their shape. No network access.
    pub async fn configure(&self, id: &str) -> Result<ConnectionConfig, ConfigError> {
        let provider = self
            .registry
            .get(id)
            .ok_or_else(|| ConfigError::UnsupportedBackend(id.to_string()))?;
        let db_type = provider.database_type();
        tracing::info!(backend = db_type.name(), "Configuring connection");

        let config = match db_type.shape() {
            ParameterShape::Relational => {
                let answers = self.prompter.relational(db_type).await?;
                relational_config(db_type, answers)?
            }
            ParameterShape::Document => {
                let answers = self.prompter.document(db_type).await?;
                document_config(answers)
            }
        };

        if !provider.validate_shape(&config) {
            return Err(ConfigError::InvalidConfiguration(missing_fields_hint(db_type)));
        }
        Ok(config)
    }

    /// Tiered validation; `true` when a usable database is reachable
    pub async fn validate_connection(&self, id: &str, config: &ConnectionConfig) -> bool {
        self.validate_connection_report(id, config).await.valid
    }

    /// Like [`validate_connection`](Self::validate_connection) but reports
    /// which tier decided and why it failed. Never returns an error.
    pub async fn validate_connection_report(
        &self,
        id: &str,
        config: &ConnectionConfig,
    ) -> ValidationReport {
        let Some(provider) = self.registry.get(id) else {
            tracing::warn!(backend = id, "No provider registered");
            return ValidationReport::failure(
                ValidationSource::Unsupported,
                format!("Unsupported database provider: {id}"),
            );
        };
        let db_type = provider.database_type();

        let key = ValidationCache::key(db_type, config);
        if self.cache.contains(&key) {
            tracing::info!(backend = db_type.name(), "Connection validated (cached)");
            return ValidationReport::success(ValidationSource::Cache);
        }

        tracing::info!(
            backend = db_type.name(),
            target = %config.target_label(db_type),
            "Validating database connection"
        );
        let report = run_tiers(provider.as_ref(), config).await;

        if report.valid {
            tracing::info!(backend = db_type.name(), "Connection successful");
            self.cache.insert(key, config);
        } else {
            tracing::warn!(
                backend = db_type.name(),
                error = report.message.as_deref().unwrap_or("unknown"),
                "Connection failed"
            );
        }
        report
    }

    /// Prompt and validate until a configuration works or `max_attempts`
    /// runs out. Shape failures count as attempts too.
    pub async fn configure_and_validate(
        &self,
        id: &str,
        max_attempts: u32,
    ) -> Result<ConnectionConfig, ConfigError> {
        let mut last_error = ConfigError::ValidationFailed("no attempts made".into());

        for attempt in 1..=max_attempts {
            match self.configure(id).await {
                Ok(config) => {
                    let report = self.validate_connection_report(id, &config).await;
                    if report.valid {
                        return Ok(config);
                    }
                    last_error = ConfigError::ValidationFailed(
                        report.message.unwrap_or_else(|| "connection failed".into()),
                    );
                }
                Err(e @ (ConfigError::UnsupportedBackend(_) | ConfigError::Prompt(_))) => {
                    return Err(e)
                }
                Err(e) => last_error = e,
            }
            tracing::warn!(attempt, max_attempts, error = %last_error, "Configuration attempt failed");
        }

        Err(last_error)
    }
}

async fn run_tiers(provider: &dyn DatabaseProvider, config: &ConnectionConfig) -> ValidationReport {
    let caps = provider.capabilities();

    if caps.create_validation {
        return match provider.check_connection_and_create_db(config).await {
            Ok(DatabaseReadiness::Existing | DatabaseReadiness::Created) => {
                ValidationReport::success(ValidationSource::CreateIfMissing)
            }
            Err(e) => ValidationReport::failure(ValidationSource::CreateIfMissing, e.to_string()),
        };
    }

    if caps.fast_validation {
        return if provider.validate_connection(config).await {
            ValidationReport::success(ValidationSource::Fast)
        } else {
            ValidationReport::failure(
                ValidationSource::Fast,
                format!(
                    "Connection check failed for {}",
                    config.target_label(provider.database_type())
                ),
            )
        };
    }

    let mut handle = provider.create_handle(config.clone());
    let connected = handle.connect().await;
    if let Err(e) = handle.disconnect().await {
        tracing::warn!(error = %e, "Failed to disconnect validation handle");
    }
    match connected {
        Ok(()) => ValidationReport::success(ValidationSource::Handle),
        Err(e) => ValidationReport::failure(ValidationSource::Handle, e.to_string()),
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn relational_config(
    db_type: DatabaseType,
    answers: RelationalAnswers,
) -> Result<ConnectionConfig, ConfigError> {
    let port = match answers.port.trim() {
        "" => db_type.default_port(),
        raw => raw.parse::<u16>().map_err(|_| {
            ConfigError::InvalidConfiguration(format!("port must be a number between 0 and 65535, got '{raw}'"))
        })?,
    };

    Ok(ConnectionConfig {
        host: non_blank(answers.host),
        port: Some(port),
        user: non_blank(answers.user),
        // Passwords are taken verbatim; whitespace may be significant
        password: Some(answers.password),
        database: non_blank(answers.database),
        url: None,
    })
}

fn document_config(answers: DocumentAnswers) -> ConnectionConfig {
    ConnectionConfig {
        url: non_blank(answers.url),
        ..ConnectionConfig::default()
    }
}

fn missing_fields_hint(db_type: DatabaseType) -> String {
    match db_type.shape() {
        ParameterShape::Relational => "host, user and database name are required".into(),
        ParameterShape::Document => "a connection URL is required".into(),
    }
}
