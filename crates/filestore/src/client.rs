//! Object storage client interface
//!
//! [`ObjectClient`] is the narrow surface the remote backend needs from an
//! object storage service. [`ObjectStoreClient`] implements it on top of the
//! `object_store` crate, which covers AWS S3, MinIO, and the in-memory store
//! used in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::object::ByteStream;

/// An object fetched from a bucket
pub struct RemoteObject {
    pub stream: ByteStream,
    pub size: Option<u64>,
}

/// Object storage client
///
/// An absent object is reported as `None` by `get_object` and `false` by
/// `object_exists`, not as an error. Deleting an absent object succeeds.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Upload the content of a local file, whose length is known up front
    async fn put_object(&self, bucket: &str, key: &str, local_file: &Path) -> StorageResult<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Option<RemoteObject>>;

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    async fn object_exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;
}

/// [`ObjectClient`] backed by one `object_store` instance per bucket
#[derive(Default, Clone)]
pub struct ObjectStoreClient {
    buckets: HashMap<String, Arc<dyn ObjectStore>>,
}

impl ObjectStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the store that serves `bucket`
    pub fn with_bucket(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.buckets.insert(bucket.into(), store);
        self
    }

    fn store(&self, bucket: &str) -> StorageResult<&Arc<dyn ObjectStore>> {
        self.buckets.get(bucket).ok_or_else(|| {
            StorageError::Configuration(format!("No object store registered for bucket {}", bucket))
        })
    }
}

/// Parse `key` as an object path, refusing keys the parser would rewrite
fn object_path(key: &str) -> StorageResult<ObjectPath> {
    let path = ObjectPath::parse(key)
        .map_err(|e| StorageError::InvalidLocation(format!("Invalid object key {}: {}", key, e)))?;

    // `parse` drops a leading or trailing "/", which would alias distinct keys
    if path.as_ref() != key {
        return Err(StorageError::InvalidLocation(format!(
            "Object key {} is not in canonical form (would be stored as {})",
            key, path
        )));
    }

    Ok(path)
}

#[async_trait]
impl ObjectClient for ObjectStoreClient {
    async fn put_object(&self, bucket: &str, key: &str, local_file: &Path) -> StorageResult<()> {
        let store = self.store(bucket)?;
        let path = object_path(key)?;

        let data = fs::read(local_file).await?;
        debug!("Uploading {} bytes to {}/{}", data.len(), bucket, path);

        store
            .put(&path, PutPayload::from(Bytes::from(data)))
            .await
            .map_err(StorageError::backend)?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Option<RemoteObject>> {
        let store = self.store(bucket)?;
        let path = object_path(key)?;
        debug!("Fetching {}/{}", bucket, path);

        let result = match store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(StorageError::backend(e)),
        };

        let size = result.meta.size as u64;
        let stream = result.into_stream().map_err(StorageError::backend);

        Ok(Some(RemoteObject {
            stream: Box::pin(stream),
            size: Some(size),
        }))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let store = self.store(bucket)?;
        let path = object_path(key)?;
        debug!("Deleting {}/{}", bucket, path);

        match store.delete(&path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StorageError::backend(e)),
        }
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        let store = self.store(bucket)?;
        let path = object_path(key)?;

        match store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::backend(e)),
        }
    }
}
