//! Storage-specific error types for SQLite operations.
//!
//! These wrap Diesel and r2d2 errors and are converted to the
//! storage-agnostic `pennyflow_core` error types before reaching callers.

use diesel::result::Error as DieselError;
use thiserror::Error;

use pennyflow_core::errors::{Error, StoreError};

/// Storage-specific errors that wrap Diesel and r2d2 types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Filesystem error: {0}")]
    Io(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => Error::Store(StoreError::Open(e.to_string())),
            StorageError::PoolError(e) => Error::Store(StoreError::Open(e.to_string())),
            StorageError::QueryFailed(e) => Error::Store(StoreError::Query(e.to_string())),
            StorageError::MigrationFailed(e) => Error::Store(StoreError::Migration(e)),
            StorageError::Io(e) => Error::Store(StoreError::Open(e)),
        }
    }
}
