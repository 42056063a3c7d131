use thiserror::Error;

/// Errors raised by a [`BlobStore`](super::BlobStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// No blob is stored under the given hash.
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The provided content hash is malformed.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    /// The payload is larger than the store accepts.
    #[error("blob exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
