//! Retrieved file content and byte stream helpers

use bytes::{Bytes, BytesMut};
use futures::{Stream, TryStreamExt};
use std::fmt;
use std::path::Path;
use std::pin::{Pin, pin};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::error::{StorageError, StorageResult};
use crate::location::Location;

/// Type alias for a boxed stream of bytes
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Content of a stored file, as returned by `StorageService::get_file`
///
/// The handle is single-use: every accessor consumes it, whatever the
/// backend. Dropping the handle (or the stream taken from it) releases the
/// underlying buffer, file handle, or response body.
pub struct StorageObject {
    location: Location,
    size: Option<u64>,
    stream: ByteStream,
}

impl StorageObject {
    pub fn new(location: Location, stream: ByteStream) -> Self {
        Self {
            location,
            size: None,
            stream,
        }
    }

    /// Wrap an in-memory buffer. The stream shares the buffer, it does not copy it.
    pub fn from_bytes(location: Location, data: Bytes) -> Self {
        let size = data.len() as u64;
        Self::new(location, stream_from_bytes(data)).with_size(size)
    }

    /// Record the content length, when the backend knows it up front
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Take the byte stream
    pub fn into_stream(self) -> ByteStream {
        self.stream
    }

    /// Copy the content to `path`, replacing whatever is there.
    /// Returns the number of bytes written.
    pub async fn write_to(self, path: impl AsRef<Path>) -> StorageResult<u64> {
        copy_to_path(self.stream, path.as_ref()).await
    }

    /// Read the whole content into memory
    pub async fn to_bytes(self) -> StorageResult<Bytes> {
        collect_bytes(self.stream).await
    }
}

impl fmt::Debug for StorageObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageObject")
            .field("location", &self.location)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Single-chunk stream over a buffer
pub fn stream_from_bytes(data: impl Into<Bytes>) -> ByteStream {
    Box::pin(futures::stream::iter(std::iter::once(Ok(data.into()))))
}

/// Stream the content of any async reader
pub fn stream_from_reader<R>(reader: R) -> ByteStream
where
    R: AsyncRead + Send + 'static,
{
    Box::pin(tokio_util::io::ReaderStream::new(reader).map_err(StorageError::Io))
}

/// Drain a stream fully into memory
///
/// The stream is dropped before returning, on success and on failure.
pub async fn collect_bytes<S>(stream: S) -> StorageResult<Bytes>
where
    S: Stream<Item = StorageResult<Bytes>>,
{
    let mut stream = pin!(stream);
    let mut buffer = BytesMut::new();

    while let Some(chunk) = stream.try_next().await? {
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer.freeze())
}

/// Copy a stream into a file at `path`, creating or truncating it
///
/// The stream is dropped before returning, on success and on failure.
/// Returns the number of bytes written.
pub async fn copy_to_path<S>(stream: S, path: &Path) -> StorageResult<u64>
where
    S: Stream<Item = StorageResult<Bytes>>,
{
    let mut stream = pin!(stream);
    let mut file = File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = stream.try_next().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Stream that yields `chunks`, then an error, and records when it is dropped
    struct FailingStream {
        chunks: Vec<Bytes>,
        dropped: Arc<AtomicBool>,
    }

    impl Stream for FailingStream {
        type Item = StorageResult<Bytes>;

        fn poll_next(
            mut self: Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Option<Self::Item>> {
            if self.chunks.is_empty() {
                let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
                std::task::Poll::Ready(Some(Err(StorageError::Io(err))))
            } else {
                std::task::Poll::Ready(Some(Ok(self.chunks.remove(0))))
            }
        }
    }

    impl Drop for FailingStream {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn failing_object(dropped: Arc<AtomicBool>) -> StorageObject {
        let stream = FailingStream {
            chunks: vec![Bytes::from_static(b"partial")],
            dropped,
        };
        StorageObject::new(Location::new("broken"), Box::pin(stream))
    }

    #[tokio::test]
    async fn test_to_bytes_joins_chunks() {
        let chunks: Vec<StorageResult<Bytes>> = vec![
            Ok(Bytes::from_static(b"x,y\n")),
            Ok(Bytes::new()),
            Ok(Bytes::from_static(b"1,2\n")),
        ];
        let object = StorageObject::new(
            Location::new("reports/jan.csv"),
            Box::pin(futures::stream::iter(chunks)),
        );
        assert_eq!(object.size(), None);
        assert_eq!(object.to_bytes().await.unwrap(), Bytes::from_static(b"x,y\n1,2\n"));
    }

    #[tokio::test]
    async fn test_from_bytes_reports_size() {
        let object = StorageObject::from_bytes(Location::new("a"), Bytes::from_static(b"abc"));
        assert_eq!(object.size(), Some(3));
        assert_eq!(object.location().as_str(), "a");
        assert_eq!(object.to_bytes().await.unwrap().as_ref(), b"abc");
    }

    #[tokio::test]
    async fn test_write_to_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out.bin");
        tokio::fs::write(&dest, b"old content that is longer").await.unwrap();

        let data: Vec<u8> = (0..=255u8).collect();
        let object = StorageObject::from_bytes(Location::new("bin"), Bytes::from(data.clone()));
        let written = object.write_to(&dest).await.unwrap();

        assert_eq!(written, 256);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_to_bytes_failure_releases_stream() {
        let dropped = Arc::new(AtomicBool::new(false));
        let result = failing_object(dropped.clone()).to_bytes().await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_write_to_failure_releases_stream() {
        let temp_dir = TempDir::new().unwrap();
        let dropped = Arc::new(AtomicBool::new(false));
        let result = failing_object(dropped.clone())
            .write_to(temp_dir.path().join("out"))
            .await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_write_to_missing_directory_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let dropped = Arc::new(AtomicBool::new(false));
        let result = failing_object(dropped.clone())
            .write_to(temp_dir.path().join("missing").join("out"))
            .await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stream_from_reader() {
        let reader = std::io::Cursor::new(b"from a reader".to_vec());
        let data = collect_bytes(stream_from_reader(reader)).await.unwrap();
        assert_eq!(data.as_ref(), b"from a reader");
    }
}
