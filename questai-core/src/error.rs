//! Error types for the QUESTAI core library.
//!
//! Quest bookkeeping itself never fails: lookups degrade to placeholders and
//! defaults. Only configuration loading and the persistence engine surface
//! errors, and the manager swallows those (with a warning) on the load path.

use thiserror::Error;

/// Top-level error type for QUESTAI operations that touch the outside world.
#[derive(Error, Debug)]
pub enum QuestError {
    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for QuestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, QuestError>;
