//! Storage service trait

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::StorageResult;
use crate::location::Location;
use crate::object::{ByteStream, StorageObject, stream_from_bytes};

/// Storage service trait
///
/// A key-value store for files: the key is a [`Location`], the value is the
/// file content. Every backend follows the same rules:
///
/// - writes create or overwrite, and the last completed write wins
/// - `delete_file` on a missing location succeeds without doing anything
/// - `get_file` is the only operation that reports
///   [`StorageError::NotFound`](crate::StorageError::NotFound)
/// - `exists` is true iff `get_file` would succeed at the time of the check
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Store the full content of `stream` under `location`
    ///
    /// The stream is consumed to the end and dropped, also on failure.
    async fn put_stream(&self, location: &Location, stream: ByteStream) -> StorageResult<()>;

    /// Store the content of a local file under `location`
    async fn put_file(&self, location: &Location, local_file: &Path) -> StorageResult<()>;

    /// Store an in-memory buffer under `location`
    async fn put_bytes(&self, location: &Location, data: Bytes) -> StorageResult<()> {
        self.put_stream(location, stream_from_bytes(data)).await
    }

    /// Delete the file at `location`, if there is one
    async fn delete_file(&self, location: &Location) -> StorageResult<()>;

    /// Get the file at `location`
    async fn get_file(&self, location: &Location) -> StorageResult<StorageObject>;

    /// Check if a file exists at `location`
    async fn exists(&self, location: &Location) -> StorageResult<bool>;
}
