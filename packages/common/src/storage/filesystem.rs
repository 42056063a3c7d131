use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;
use tracing::{debug, warn};

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BlobStore, BoxReader, StoredBlob};

/// Proof videos and profile images on local disk, one file per distinct
/// payload at `{root}/{first hash byte}/{remaining hash bytes}`.
///
/// Payloads are staged under `{root}/.tmp` and hard-linked into place, so a
/// download never sees a half-written file and two uploads of the same bytes
/// cannot both claim to have created it.
pub struct FilesystemBlobStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, max_size })
    }

    fn media_path(&self, hash: &ContentHash) -> PathBuf {
        self.root
            .join(hash.shard_prefix())
            .join(hash.shard_suffix())
    }

    fn staging_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }

    /// Link a staged file to its final path. `Ok(false)` means another upload
    /// of the same bytes got there first.
    async fn publish(&self, staged: &Path, target: &Path) -> Result<bool, StorageError> {
        if let Some(shard) = target.parent() {
            fs::create_dir_all(shard).await?;
        }
        match fs::hard_link(staged, target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, data: &[u8]) -> Result<StoredBlob, StorageError> {
        let size = data.len() as u64;
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let hash = ContentHash::compute(data);
        let target = self.media_path(&hash);
        if fs::try_exists(&target).await? {
            debug!(hash = %hash, "Media already on disk");
            return Ok(StoredBlob {
                hash,
                created: false,
            });
        }

        let staged = self.staging_path();
        let published = match fs::write(&staged, data).await {
            Ok(()) => self.publish(&staged, &target).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = fs::remove_file(&staged).await
            && e.kind() != ErrorKind::NotFound
        {
            warn!(path = %staged.display(), error = %e, "Failed to clear staged upload");
        }

        let created = published?;
        debug!(hash = %hash, size, created, "Stored media");
        Ok(StoredBlob { hash, created })
    }

    async fn get_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.media_path(hash)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.media_path(hash)).await?)
    }

    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        match fs::remove_file(self.media_path(hash)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
