//! Local disk storage backend

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::BufReader;
use tracing::{debug, info};

use crate::backend::StorageService;
use crate::error::{StorageError, StorageResult};
use crate::location::Location;
use crate::object::{ByteStream, StorageObject, collect_bytes, stream_from_reader};

/// Local disk storage backend
///
/// Stores each file at `<root>/<location>`. Locations that would resolve
/// outside the root (`..` segments, or an absolute path left over after the
/// leading slash is stripped) are rejected.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend, creating the root directory if needed
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;

        info!("Initialized local storage at {:?}", root);

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the file path for a location
    fn file_path(&self, location: &Location) -> Result<PathBuf, StorageError> {
        let relative = Path::new(location.as_str());
        let mut has_name = false;

        for component in relative.components() {
            match component {
                Component::Normal(_) => has_name = true,
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::InvalidLocation(format!(
                        "{} resolves outside the storage root",
                        location
                    )));
                }
            }
        }

        if !has_name {
            return Err(StorageError::InvalidLocation(format!(
                "'{}' does not name a file",
                location
            )));
        }

        Ok(self.root.join(relative))
    }

    /// Create parent directories
    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Whether `path` is an existing regular file
    async fn is_file(path: &Path) -> StorageResult<bool> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// A component of the path is missing, or is a file where a directory was expected
fn is_missing(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

#[async_trait]
impl StorageService for LocalStorage {
    async fn put_stream(&self, location: &Location, stream: ByteStream) -> StorageResult<()> {
        let path = self.file_path(location)?;
        self.ensure_parent(&path).await?;

        let data = collect_bytes(stream).await?;
        debug!("Writing {} bytes to {:?}", data.len(), path);
        fs::write(&path, &data).await?;

        Ok(())
    }

    async fn put_file(&self, location: &Location, local_file: &Path) -> StorageResult<()> {
        let path = self.file_path(location)?;
        self.ensure_parent(&path).await?;

        debug!("Copying {:?} to {:?}", local_file, path);
        fs::copy(local_file, &path).await?;

        Ok(())
    }

    async fn delete_file(&self, location: &Location) -> StorageResult<()> {
        let path = self.file_path(location)?;

        // Directories are never removed
        if !Self::is_file(&path).await? {
            return Ok(());
        }

        debug!("Deleting file at {:?}", path);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if is_missing(&e) => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn get_file(&self, location: &Location) -> StorageResult<StorageObject> {
        let path = self.file_path(location)?;
        if !Self::is_file(&path).await? {
            return Err(StorageError::NotFound(location.clone()));
        }

        debug!("Streaming file from {:?}", path);
        let file = File::open(&path).await.map_err(|e| {
            if is_missing(&e) {
                StorageError::NotFound(location.clone())
            } else {
                StorageError::Io(e)
            }
        })?;
        let size = file.metadata().await?.len();

        let stream = stream_from_reader(BufReader::new(file));
        Ok(StorageObject::new(location.clone(), stream).with_size(size))
    }

    async fn exists(&self, location: &Location) -> StorageResult<bool> {
        let path = self.file_path(location)?;
        Self::is_file(&path).await
    }
}
