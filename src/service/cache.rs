use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::db::connection::{ConnectionConfig, DatabaseType, ParameterShape};

/// How long a validated configuration stays trusted
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    config: ConnectionConfig,
    created_at: Instant,
}

/// Session cache of configurations that passed connection validation.
///
/// Expired entries are dropped by the lookup that finds them; nothing sweeps
/// in the background. Concurrent writers for one key simply overwrite each
/// other.
#[derive(Debug)]
pub struct ValidationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for ValidationCache {
    fn default() -> Self {
        Self::with_ttl(CACHE_TTL)
    }
}

impl ValidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// `<id>:<host>:<port>:<user>:<database>` for relational backends,
    /// `<id>:<url>` for the document store. The password is never part of it.
    pub fn key(db_type: DatabaseType, config: &ConnectionConfig) -> String {
        match db_type.shape() {
            ParameterShape::Relational => format!(
                "{}:{}:{}:{}:{}",
                db_type.id(),
                config.host.as_deref().unwrap_or_default(),
                config.effective_port(db_type),
                config.user.as_deref().unwrap_or_default(),
                config.database.as_deref().unwrap_or_default()
            ),
            ParameterShape::Document => format!(
                "{}:{}",
                db_type.id(),
                config.url.as_deref().unwrap_or_default()
            ),
        }
    }

    /// A copy of the cached config, if present and not expired
    pub fn get(&self, key: &str) -> Option<ConnectionConfig> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if entry.created_at.elapsed() < self.ttl {
            return Some(entry.config.clone());
        }
        entries.remove(key);
        tracing::debug!(key, "Dropped expired validation cache entry");
        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store or refresh an entry with the current time
    pub fn insert(&self, key: String, config: &ConnectionConfig) {
        self.lock().insert(
            key,
            CacheEntry {
                config: config.clone(),
                created_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned map only means a writer panicked mid-insert
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql_config() -> ConnectionConfig {
        ConnectionConfig::relational("localhost", 3306, "root", "secret", "app_db")
    }

    #[test]
    fn relational_key_skips_password() {
        let key = ValidationCache::key(DatabaseType::MySql, &mysql_config());
        assert_eq!(key, "mysql:localhost:3306:root:app_db");
        assert!(!key.contains("secret"));
    }

    #[test]
    fn relational_key_uses_effective_port() {
        let mut config = mysql_config();
        config.port = None;
        assert_eq!(
            ValidationCache::key(DatabaseType::PostgreSql, &config),
            "postgresql:localhost:5432:root:app_db"
        );
    }

    #[test]
    fn document_key_uses_full_url() {
        let a = ValidationCache::key(DatabaseType::MongoDb, &ConnectionConfig::document("mongodb://h/db"));
        let b = ValidationCache::key(
            DatabaseType::MongoDb,
            &ConnectionConfig::document("mongodb://h:27017/db"),
        );
        assert_eq!(a, "mongodb:mongodb://h/db");
        assert_ne!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl_and_are_purged() {
        let cache = ValidationCache::new();
        let key = ValidationCache::key(DatabaseType::MySql, &mysql_config());
        cache.insert(key.clone(), &mysql_config());

        tokio::time::advance(CACHE_TTL - Duration::from_secs(1)).await;
        assert_eq!(cache.get(&key), Some(mysql_config()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_refreshes_timestamp() {
        let cache = ValidationCache::with_ttl(Duration::from_secs(10));
        cache.insert("k".into(), &mysql_config());

        tokio::time::advance(Duration::from_secs(8)).await;
        cache.insert("k".into(), &mysql_config());
        tokio::time::advance(Duration::from_secs(8)).await;

        assert!(cache.contains("k"));
    }

    #[test]
    fn reads_return_copies() {
        let cache = ValidationCache::new();
        cache.insert("k".into(), &mysql_config());

        let mut copy = cache.get("k").unwrap();
        copy.host = Some("elsewhere".into());

        assert_eq!(cache.get("k").unwrap().host.as_deref(), Some("localhost"));
    }
}
