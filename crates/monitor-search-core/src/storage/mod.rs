//! Storage layer - SQLite
//!
//! Provides database management and migrations for the issue tracker read model.
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and migration on read-write open
//!
//! # Usage
//!
//! ```ignore
//! use monitor_search_core::storage::{Database, DatabaseConfig};
//!
//! // Create an in-memory database for testing
//! let db = Database::in_memory().await?;
//!
//! // Open a file-backed database, creating and migrating it if needed
//! let db = Database::new(DatabaseConfig::with_path("monitor.db")).await?;
//!
//! // Open an existing database for searching without writing to it
//! let db = Database::new(DatabaseConfig::with_path("monitor.db").read_only()).await?;
//! ```

pub mod database;
pub mod migrations;

// Re-export commonly used types
pub use database::{AccessMode, Database, DatabaseConfig, Location};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
