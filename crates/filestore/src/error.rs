//! Storage error types

use thiserror::Error;

use crate::location::Location;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Only `get_file` produces this; `exists` reports false and
    /// `delete_file` is a no-op instead.
    #[error("File not found: {0}")]
    NotFound(Location),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Wrap a backend client failure as an I/O error, keeping it as the source
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StorageError::Io(std::io::Error::other(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
