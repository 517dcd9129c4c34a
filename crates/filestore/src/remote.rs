//! Remote object storage backend

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::backend::StorageService;
use crate::client::ObjectClient;
use crate::error::{StorageError, StorageResult};
use crate::location::Location;
use crate::object::{ByteStream, StorageObject, copy_to_path};

/// Remote object storage backend
///
/// Every location is stored as the object whose key is `location.as_str()`
/// in a single bucket. Uploads go through a local file because the client
/// needs the content length before it starts: a stream is first staged into
/// a scratch file under `scratch_dir`, which is removed once the upload has
/// finished, whatever its outcome.
pub struct RemoteStorage {
    client: Arc<dyn ObjectClient>,
    bucket: String,
    scratch_dir: PathBuf,
}

impl RemoteStorage {
    /// Create a remote backend staging uploads in the system temp directory
    pub fn new(client: Arc<dyn ObjectClient>, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        info!("Initialized remote storage: bucket={}", bucket);

        Self {
            client,
            bucket,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Stage uploads under `dir` instead of the system temp directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn stage_and_upload(
        &self,
        location: &Location,
        stream: ByteStream,
        scratch: &Path,
    ) -> StorageResult<()> {
        let staged = copy_to_path(stream, scratch).await?;
        debug!("Staged {} bytes for {} in {:?}", staged, location, scratch);
        self.put_file(location, scratch).await
    }
}

#[async_trait]
impl StorageService for RemoteStorage {
    async fn put_stream(&self, location: &Location, stream: ByteStream) -> StorageResult<()> {
        let scratch = tempfile::Builder::new()
            .prefix("filestore-put")
            .suffix(".tmp")
            .tempfile_in(&self.scratch_dir)?;

        let result = self.stage_and_upload(location, stream, scratch.path()).await;

        // Cleanup never overrides the upload outcome
        if let Err(e) = NamedTempFile::close(scratch) {
            warn!("Failed to remove scratch file for {}: {}", location, e);
        }

        result
    }

    async fn put_file(&self, location: &Location, local_file: &Path) -> StorageResult<()> {
        if !fs::try_exists(local_file).await? {
            return Err(StorageError::InvalidArgument(format!(
                "{} does not exist",
                local_file.display()
            )));
        }

        debug!("Uploading {:?} to {}/{}", local_file, self.bucket, location);
        self.client
            .put_object(&self.bucket, location.as_str(), local_file)
            .await
    }

    async fn delete_file(&self, location: &Location) -> StorageResult<()> {
        debug!("Deleting {}/{}", self.bucket, location);
        self.client
            .delete_object(&self.bucket, location.as_str())
            .await
    }

    async fn get_file(&self, location: &Location) -> StorageResult<StorageObject> {
        let object = self
            .client
            .get_object(&self.bucket, location.as_str())
            .await?
            .ok_or_else(|| StorageError::NotFound(location.clone()))?;

        let handle = StorageObject::new(location.clone(), object.stream);
        Ok(match object.size {
            Some(size) => handle.with_size(size),
            None => handle,
        })
    }

    async fn exists(&self, location: &Location) -> StorageResult<bool> {
        self.client
            .object_exists(&self.bucket, location.as_str())
            .await
    }
}
