//! Common error types for FarmOptima

use thiserror::Error;

use crate::snapshot::ImportError;
use crate::store::StorageError;

/// Common result type for FarmOptima operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across FarmOptima crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input for a record
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend failure surfaced to the caller
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Snapshot import rejected
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),
}
