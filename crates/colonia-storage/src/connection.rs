use crate::error::{StorageError, StorageResult};
use colonia_core::constants::{DEFAULT_DATABASE_PATH, DEFAULT_MAX_CONNECTIONS};
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Pool settings for the SQLite record store
///
/// The file is created on first open and the embedded migrations always
/// run, so a fresh deployment needs nothing beyond a writable path.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_path: String,

    pub max_connections: u32,

    /// Idle connections kept open; never more than `max_connections`
    pub min_connections: u32,

    /// Recycle connections after this long
    pub max_lifetime: Duration,

    pub acquire_timeout: Duration,

    /// How long a writer waits on SQLite's file lock before failing
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 2,
            max_lifetime: Duration::from_secs(30 * 60),
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(10),
        }
    }
}

impl DatabaseConfig {
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Idle floor actually handed to the pool
    fn effective_min_connections(&self) -> u32 {
        self.min_connections.min(self.max_connections)
    }
}

/// Database connection pool wrapper
///
/// Cheap to clone; every clone shares the same pool. This is the single
/// long-lived record-store handle handed to repositories at startup.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and apply migrations
    ///
    /// # Example
    ///
    /// ```no_run
    /// use colonia_storage::connection::{Database, DatabaseConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = DatabaseConfig::new("colonia.db").max_connections(10);
    ///
    /// let db = Database::new(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: DatabaseConfig) -> StorageResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!("Failed to create database directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.database_path))
            .map_err(|e| StorageError::Configuration(format!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.effective_min_connections())
            .max_lifetime(Some(config.max_lifetime))
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        info!(
            path = %config.database_path,
            max_connections = config.max_connections,
            "Opened database pool"
        );

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Create an in-memory database (primarily for testing)
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite in-memory connection is its own database.
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations
    ///
    /// Migrations under the workspace `migrations/` directory are embedded at
    /// compile time by `sqlx::migrate!`; the path cannot change at runtime.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        debug!("Database migrations applied");
        Ok(())
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool
    ///
    /// Waits for all active connections to be returned to the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::new("test.db");

        assert_eq!(config.database_path, "test.db");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.max_lifetime, Duration::from_secs(1800));
        assert_eq!(config.busy_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_min_connections_never_exceed_max() {
        let config = DatabaseConfig::new("test.db").max_connections(1);
        assert_eq!(config.effective_min_connections(), 1);

        let config = DatabaseConfig::new("test.db")
            .max_connections(8)
            .min_connections(3);
        assert_eq!(config.effective_min_connections(), 3);
    }

    #[tokio::test]
    async fn test_single_connection_file_database_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single.db");
        let config = DatabaseConfig::new(path.to_string_lossy().to_string()).max_connections(1);

        let db = Database::new(config).await.unwrap();
        db.health_check().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::in_memory().await.unwrap();

        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('usuarios', 'colonias', 'residencias',
                          'residencias_usuarios', 'visitas', 'anuncios')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();

        assert_eq!(tables.0, 6);
    }
}
