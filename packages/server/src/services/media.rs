use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use common::storage::{BlobStore, ContentHash, StoredBlob};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entity::media;
use crate::error::AppError;

/// An uploaded file held in memory until admission decides to keep it.
#[derive(Clone, Debug)]
pub struct MediaPayload {
    pub data: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl MediaPayload {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Declared content type, or one guessed from the filename.
    pub fn resolved_content_type(&self) -> Option<String> {
        self.content_type
            .clone()
            .filter(|ct| !ct.trim().is_empty())
            .or_else(|| {
                self.filename
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first())
                    .map(|mime| mime.to_string())
            })
    }
}

/// Insert the `media` row describing a stored blob.
pub async fn insert_media_row<C: ConnectionTrait>(
    conn: &C,
    hash: &ContentHash,
    payload: &MediaPayload,
    kind: &str,
    uploaded_by: &str,
    now: DateTime<Utc>,
) -> Result<media::Model, AppError> {
    let row = media::ActiveModel {
        id: Set(Uuid::now_v7().to_string()),
        content_hash: Set(hash.to_hex()),
        filename: Set(payload
            .filename
            .clone()
            .unwrap_or_else(|| format!("{kind}-{}", hash.shard_prefix()))),
        content_type: Set(payload.resolved_content_type()),
        size: Set(i64::try_from(payload.data.len()).unwrap_or(i64::MAX)),
        kind: Set(kind.to_string()),
        uploaded_by: Set(uploaded_by.to_string()),
        created_at: Set(now),
    };
    Ok(row.insert(conn).await?)
}

/// How long a failed upload waits before deciding its blob is unwanted.
///
/// Covers a concurrent upload of the same bytes that found the blob already on
/// disk but has not committed its `media` row yet.
pub const ORPHAN_REAP_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// Some `media` row still points at the blob.
    Kept,
    Reaped,
    /// A reference committed while the blob was being deleted; it was written
    /// back from the caller's copy of the bytes.
    Restored,
}

async fn count_references(db: &DatabaseConnection, hash: &ContentHash) -> Result<u64, AppError> {
    Ok(media::Entity::find()
        .filter(media::Column::ContentHash.eq(hash.to_hex()))
        .count(db)
        .await?)
}

/// Delete a blob if no `media` row points at it, then check again and put the
/// bytes back if a row appeared in between.
pub async fn reap_if_unreferenced(
    db: &DatabaseConnection,
    blob_store: &dyn BlobStore,
    hash: &ContentHash,
    data: &[u8],
) -> Result<ReapOutcome, AppError> {
    if count_references(db, hash).await? > 0 {
        return Ok(ReapOutcome::Kept);
    }
    blob_store.delete(hash).await?;

    if count_references(db, hash).await? > 0 {
        blob_store.put(data).await?;
        return Ok(ReapOutcome::Restored);
    }
    Ok(ReapOutcome::Reaped)
}

/// Best-effort cleanup of a blob whose owning row never committed.
///
/// Only the upload that created the blob reaps it. Runs detached after
/// [`ORPHAN_REAP_GRACE`]; the caller's response does not wait for it.
pub fn spawn_orphan_reap(
    db: DatabaseConnection,
    blob_store: Arc<dyn BlobStore>,
    stored: StoredBlob,
    data: Bytes,
) {
    if !stored.created {
        debug!(hash = %stored.hash, "Blob predates this upload; leaving it");
        return;
    }
    tokio::spawn(async move {
        tokio::time::sleep(ORPHAN_REAP_GRACE).await;
        let hash = stored.hash;
        match reap_if_unreferenced(&db, &*blob_store, &hash, &data).await {
            Ok(ReapOutcome::Reaped) => info!(hash = %hash, "Reaped orphaned media blob"),
            Ok(ReapOutcome::Restored) => {
                warn!(hash = %hash, "Orphaned blob gained a reference mid-reap; restored it")
            }
            Ok(ReapOutcome::Kept) => {}
            Err(e) => warn!(hash = %hash, error = ?e, "Failed to reap orphaned media blob"),
        }
    });
}
