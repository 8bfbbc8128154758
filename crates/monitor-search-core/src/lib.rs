//! Monitor Search Core Library
//!
//! This crate provides the search provider for the Monitor issue tracker:
//! - Area selection and query dispatch
//! - Predicate building (SQL and in-memory evaluation)
//! - Result decoration and merging
//! - Storage (SQLite schema and migrations)
//! - Configuration

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::search::{
        AccessLevels, PhraseMode, SearchOrdering, SearchRequest, SearchResult, SearchService,
        SearchSettings,
    };
    pub use crate::error::{Error, Result};
    pub use crate::storage::{Database, DatabaseConfig};
}
