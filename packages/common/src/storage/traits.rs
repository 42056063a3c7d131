use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::hash::ContentHash;

pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Result of storing a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub hash: ContentHash,
    /// `false` when identical bytes were already on disk. A caller that did
    /// not create the blob must never reap it.
    pub created: bool,
}

/// Content-addressed storage for uploaded media.
///
/// Identical payloads share one blob, so callers must check for remaining
/// references before deleting.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under their content hash. Of several concurrent writers of
    /// the same bytes, exactly one sees `created == true`.
    async fn put(&self, data: &[u8]) -> Result<StoredBlob, StorageError>;

    /// Open a stored blob for streaming.
    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError>;

    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(hash).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError>;

    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError>;
}
