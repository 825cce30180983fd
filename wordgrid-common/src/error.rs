//! Shared error type for the wordgrid crates
//!
//! Covers bootstrap concerns (config files, log files, the pool database).
//! Pipeline failures have their own type in `wordgrid-gen`.

use thiserror::Error;

/// Result alias over [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Puzzle pool query or connection failed
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem access (config, log file, database directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable TOML or an unusable setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller passed data that cannot be stored, such as a puzzle without groups
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization or other failure not caused by the caller
    #[error("Internal error: {0}")]
    Internal(String),
}
