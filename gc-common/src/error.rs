//! Common error types for GarageCloud

use thiserror::Error;

use crate::import::ImportError;
use crate::sync_code::SyncError;

/// Common result type for GarageCloud operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the collection pipeline and its services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization of the record array failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (e.g. manual entry without a model name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Spreadsheet import rejected
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// Sync token rejected
    #[error("Invalid sync code: {0}")]
    Sync(#[from] SyncError),
}
