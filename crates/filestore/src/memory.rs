//! In-memory storage backend

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::backend::StorageService;
use crate::error::{StorageError, StorageResult};
use crate::location::Location;
use crate::object::{ByteStream, StorageObject, collect_bytes};

/// In-memory storage backend
///
/// Keeps every file as an immutable buffer in a map. A write drains its
/// source completely before swapping the entry, so readers see either the
/// old content or the new one, never a partial write.
#[derive(Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<Location, Bytes>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    fn insert(&self, location: &Location, data: Bytes) {
        debug!("Storing {} bytes at {} in memory", data.len(), location);
        self.files.write().insert(location.clone(), data);
    }
}

#[async_trait]
impl StorageService for MemoryStorage {
    async fn put_stream(&self, location: &Location, stream: ByteStream) -> StorageResult<()> {
        let data = collect_bytes(stream).await?;
        self.insert(location, data);
        Ok(())
    }

    async fn put_file(&self, location: &Location, local_file: &Path) -> StorageResult<()> {
        let data = fs::read(local_file).await?;
        self.insert(location, Bytes::from(data));
        Ok(())
    }

    async fn put_bytes(&self, location: &Location, data: Bytes) -> StorageResult<()> {
        self.insert(location, data);
        Ok(())
    }

    async fn delete_file(&self, location: &Location) -> StorageResult<()> {
        debug!("Deleting {} from memory", location);
        self.files.write().remove(location);
        Ok(())
    }

    async fn get_file(&self, location: &Location) -> StorageResult<StorageObject> {
        let data = self
            .files
            .read()
            .get(location)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(location.clone()))?;

        Ok(StorageObject::from_bytes(location.clone(), data))
    }

    async fn exists(&self, location: &Location) -> StorageResult<bool> {
        Ok(self.files.read().contains_key(location))
    }
}
