use axum::Json;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::storage::ContentHash;
use sea_orm::EntityTrait;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::config::MediaConfig;
use crate::entity::media;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::media::MediaUploadResponse;
use crate::services::media::{MediaPayload, insert_media_row, spawn_orphan_reap};
use crate::state::AppState;

const FORM_OVERHEAD: usize = 64 * 1024;

pub fn upload_body_limit(config: &MediaConfig) -> DefaultBodyLimit {
    let image = usize::try_from(config.max_image_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(image.saturating_add(FORM_OVERHEAD))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Media",
    operation_id = "uploadImage",
    summary = "Upload an image",
    description = "Multipart field `image`. Only `image/*` content is accepted.",
    request_body(content_type = "multipart/form-data", description = "The image file"),
    responses(
        (status = 201, description = "Image stored", body = MediaUploadResponse),
        (status = 400, description = "Missing, oversized or non-image file (INVALID_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn upload_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut payload: Option<MediaPayload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidRequest(format!("Failed to read image: {e}")))?;
            payload = Some(MediaPayload {
                data,
                filename,
                content_type,
            });
        }
    }

    let payload = payload
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Image file is required".into()))?;
    if !payload
        .resolved_content_type()
        .is_some_and(|ct| ct.starts_with("image/"))
    {
        return Err(AppError::InvalidRequest("Only image files are allowed".into()));
    }
    if payload.data.len() as u64 > state.config.media.max_image_size {
        return Err(AppError::InvalidRequest(format!(
            "Image exceeds maximum size of {} bytes",
            state.config.media.max_image_size
        )));
    }

    let stored = state.blob_store.put(&payload.data).await?;
    let now = state.clock.now();

    let row = match insert_media_row(
        &state.db,
        &stored.hash,
        &payload,
        media::KIND_IMAGE,
        &auth_user.user_id,
        now,
    )
    .await
    {
        Ok(row) => row,
        Err(e) => {
            spawn_orphan_reap(
                state.db.clone(),
                state.blob_store.clone(),
                stored,
                payload.data.clone(),
            );
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(MediaUploadResponse {
            url: media::url_for(&row.id),
            id: row.id,
            filename: row.filename,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Media",
    operation_id = "downloadMedia",
    summary = "Fetch an uploaded file",
    description = "Streams the file. Supports ETag-based caching via If-None-Match. Public so that \
        media URLs work in plain `<img>` and `<video>` tags.",
    params(("id" = String, Path, description = "Media ID")),
    responses(
        (status = 200, description = "File content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let row = media::Entity::find_by_id(id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".into()))?;

    let etag_value = format!("\"{}\"", row.content_hash);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let hash = ContentHash::from_hex(&row.content_hash)?;
    let reader = state.blob_store.get_stream(&hash).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = row
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, row.size.to_string())
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "public, max-age=86400, immutable")
        .body(body)
        .map_err(|e| AppError::StorageFailure(format!("Failed to build response: {e}")))
}
