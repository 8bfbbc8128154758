//! SQLite connection for the issue tracker read model
//!
//! Searches open an existing, fully migrated database read-only. Maintenance
//! commands open it read-write, creating the file and applying migrations.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::storage::migrations::{self, MigrationStatus};

/// Default maximum connections in the pool
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    /// Private in-memory database; always read-write
    Memory,
}

/// How a database file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Create the file if missing and apply pending migrations
    #[default]
    ReadWrite,
    /// Open an existing database at the current schema version; never writes
    ReadOnly,
}

/// Database configuration options
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub location: Location,
    pub max_connections: u32,
    pub mode: AccessMode,
}

impl DatabaseConfig {
    /// Read-write access to the database file at `path`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            mode: AccessMode::ReadWrite,
        }
    }

    /// A fresh, migrated in-memory database
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            // Each connection would otherwise get its own empty database
            max_connections: 1,
            mode: AccessMode::ReadWrite,
        }
    }

    /// Set the maximum number of connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Open without creating, migrating or writing
    pub fn read_only(mut self) -> Self {
        if let Location::File(_) = self.location {
            self.mode = AccessMode::ReadOnly;
        }
        self
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions> {
        let options = match (&self.location, self.mode) {
            (Location::Memory, _) => SqliteConnectOptions::from_str("sqlite::memory:")?,
            (Location::File(path), AccessMode::ReadWrite) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
            (Location::File(path), AccessMode::ReadOnly) => {
                SqliteConnectOptions::new().filename(path).read_only(true)
            }
        };
        Ok(options.foreign_keys(true))
    }
}

/// Get the default database path
pub fn default_database_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("monitor-search").join("monitor.db"),
        None => PathBuf::from("monitor.db"),
    }
}

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    location: Location,
}

impl Database {
    /// Connect according to `config`
    ///
    /// Read-write connections bring the schema up to date. Read-only
    /// connections fail if the file is missing or its schema is behind.
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        if let (Location::File(path), AccessMode::ReadWrite) = (&config.location, config.mode) {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await
            .with_context(|| format!("Failed to open database: {}", describe(&config.location)))?;

        let db = Self {
            pool,
            location: config.location,
        };

        match config.mode {
            AccessMode::ReadWrite => db.migrate().await?,
            AccessMode::ReadOnly => {
                let status = db.migration_status().await?;
                if status.needs_migration {
                    bail!(
                        "Database {} is at schema v{}, v{} is required. \
                         Run `monitor-search doctor` to upgrade it.",
                        describe(&db.location),
                        status.current_version,
                        status.target_version
                    );
                }
            }
        }

        tracing::debug!(
            database = %describe(&db.location),
            mode = ?config.mode,
            "Database opened"
        );
        Ok(db)
    }

    /// Create an in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self> {
        Self::new(DatabaseConfig::in_memory()).await
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Database file path; `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    async fn migrate(&self) -> Result<()> {
        migrations::run_migrations(&self.pool)
            .await
            .context("Failed to run database migrations")
    }

    /// Check migration status
    pub async fn migration_status(&self) -> Result<MigrationStatus> {
        migrations::migration_status(&self.pool)
            .await
            .context("Failed to check migration status")
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn describe(location: &Location) -> String {
    match location {
        Location::File(path) => path.display().to_string(),
        Location::Memory => ":memory:".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::in_memory()
            .await
            .expect("Failed to create in-memory database");

        db.health_check().await.expect("Health check failed");
        assert!(db.path().is_none());

        let status = db
            .migration_status()
            .await
            .expect("Failed to get migration status");
        assert!(!status.needs_migration);
    }

    #[test]
    fn test_database_config_builder() {
        let config = DatabaseConfig::with_path("/tmp/test.db")
            .max_connections(10)
            .read_only();

        assert_eq!(config.location, Location::File(PathBuf::from("/tmp/test.db")));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.mode, AccessMode::ReadOnly);

        let memory = DatabaseConfig::in_memory().read_only();
        assert_eq!(memory.mode, AccessMode::ReadWrite);
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("monitor.db");

        let db = Database::new(DatabaseConfig::with_path(&path))
            .await
            .expect("Failed to create file database");

        assert!(path.exists());
        assert_eq!(db.path(), Some(path.as_path()));
        db.close().await;
    }

    #[tokio::test]
    async fn test_read_only_missing_file_fails_without_creating_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typo.db");

        let err = Database::new(DatabaseConfig::with_path(&path).read_only())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to open database"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_read_only_rejects_unmigrated_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.db");

        let pool = SqlitePoolOptions::new()
            .connect_with(SqliteConnectOptions::new().filename(&path).create_if_missing(true))
            .await
            .unwrap();
        pool.close().await;

        let err = Database::new(DatabaseConfig::with_path(&path).read_only())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("schema v0"));

        let tables: (i64,) = {
            let pool = SqlitePoolOptions::new()
                .connect_with(SqliteConnectOptions::new().filename(&path))
                .await
                .unwrap();
            let count = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master")
                .fetch_one(&pool)
                .await
                .unwrap();
            pool.close().await;
            count
        };
        assert_eq!(tables.0, 0, "read-only open must not migrate");
    }

    #[tokio::test]
    async fn test_read_only_connection_refuses_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("monitor.db");

        Database::new(DatabaseConfig::with_path(&path))
            .await
            .expect("Failed to create database")
            .close()
            .await;

        let db = Database::new(DatabaseConfig::with_path(&path).read_only())
            .await
            .expect("Failed to open database read-only");
        db.health_check().await.expect("Health check failed");

        let insert = sqlx::query("INSERT INTO projects (name) VALUES ('Viewer')")
            .execute(db.pool())
            .await;
        assert!(insert.is_err());
        db.close().await;
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = Database::in_memory().await.expect("Failed to create database");

        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .expect("Failed to check foreign_keys pragma");

        assert_eq!(result.0, 1, "Foreign keys should be enabled");
    }

    #[tokio::test]
    async fn test_comment_cascade_delete() {
        let db = Database::in_memory().await.expect("Failed to create database");

        sqlx::query("INSERT INTO issues (id, title) VALUES (1, 'Broken build')")
            .execute(db.pool())
            .await
            .expect("Failed to insert issue");
        sqlx::query("INSERT INTO comments (id, issue_id, text) VALUES (7, 1, 'same here')")
            .execute(db.pool())
            .await
            .expect("Failed to insert comment");

        sqlx::query("DELETE FROM issues WHERE id = 1")
            .execute(db.pool())
            .await
            .expect("Failed to delete issue");

        let result: Option<(i64,)> = sqlx::query_as("SELECT id FROM comments WHERE id = 7")
            .fetch_optional(db.pool())
            .await
            .expect("Failed to query comment");
        assert!(result.is_none(), "Comment should be deleted via cascade");
    }
}
