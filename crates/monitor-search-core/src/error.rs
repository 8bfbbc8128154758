//! Error types for Monitor search

use thiserror::Error;

/// Result type alias using the search crate's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Search error types with helpful messages and suggestions
///
/// Only store and configuration failures surface here. Blank queries, disabled
/// components, and non-overlapping areas are not errors: the search path
/// answers those with an empty result list.
#[derive(Error, Debug)]
pub enum Error {
    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::DatabaseError(_) => Some("monitor-search doctor".to_string()),
            Self::ConfigError(_) => Some("monitor-search config list".to_string()),
            _ => None,
        }
    }
}
