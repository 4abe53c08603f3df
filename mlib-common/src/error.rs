//! Common error types for musiclib

use thiserror::Error;

/// Common result type for musiclib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the storage and configuration layers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write rejected because it would duplicate a unique key
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A single-row statement touched an unexpected number of rows
    #[error("Unexpected number of affected rows: expected {expected}, got {actual}")]
    UnexpectedRowCount { expected: u64, actual: u64 },
}
