use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::config::MediaConfig;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::submission::{CreateSubmissionResponse, FeedQuery, FeedResponse};
use crate::services::admission::{AdmissionService, SubmissionRequest};
use crate::services::feed::{FeedPaginator, clamp_limit, enrich_submissions};
use crate::services::media::MediaPayload;
use crate::state::AppState;

/// Multipart overhead allowed on top of the video itself.
const FORM_OVERHEAD: usize = 64 * 1024;

pub fn submission_body_limit(media: &MediaConfig) -> DefaultBodyLimit {
    let video = usize::try_from(media.max_video_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(video.saturating_add(FORM_OVERHEAD))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Submit proof for a challenge",
    description = "Multipart fields `challengeId`, `campusId` and `video`. Requires a buy-in for \
        the previous UTC day. Only one submission per user per challenge is accepted.",
    request_body(content_type = "multipart/form-data", description = "challengeId, campusId and the video file"),
    responses(
        (status = 201, description = "Submission created", body = CreateSubmissionResponse),
        (status = 400, description = "Missing fields (INVALID_REQUEST) or challenge closed (CHALLENGE_EXPIRED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "No buy-in for yesterday (BUY_IN_REQUIRED)", body = ErrorBody),
        (status = 404, description = "Challenge not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already submitted (DUPLICATE_SUBMISSION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = %auth_user.user_id))]
pub async fn create_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut request = SubmissionRequest {
        user_id: Some(auth_user.user_id),
        ..Default::default()
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("challengeId") => {
                request.challenge_id = Some(field.text().await.map_err(|e| {
                    AppError::InvalidRequest(format!("Failed to read challengeId: {e}"))
                })?);
            }
            Some("campusId") => {
                request.campus_id = Some(field.text().await.map_err(|e| {
                    AppError::InvalidRequest(format!("Failed to read campusId: {e}"))
                })?);
            }
            Some("video") => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidRequest(format!("Failed to read video: {e}")))?;
                request.media = Some(MediaPayload {
                    data,
                    filename,
                    content_type,
                });
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let created = AdmissionService::from_state(&state).submit(request).await?;
    let submission = enrich_submissions(&state.db, vec![created])
        .await?
        .pop()
        .ok_or_else(|| AppError::StorageFailure("submission vanished after insert".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSubmissionResponse {
            message: "Submission created".into(),
            submission,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/feed/{campus_id}",
    tag = "Submissions",
    operation_id = "getCampusFeed",
    summary = "Page through a campus's submissions, newest first",
    description = "Pass the returned `nextCursor` as `cursor` to get the following page. \
        `nextCursor` is omitted on the last page.",
    params(
        ("campus_id" = String, Path, description = "Campus ID"),
        FeedQuery,
    ),
    responses(
        (status = 200, description = "Feed page", body = FeedResponse),
        (status = 400, description = "Invalid cursor (INVALID_REQUEST)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn campus_feed(
    State(state): State<AppState>,
    Path(campus_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, AppError> {
    let limit = clamp_limit(query.limit.as_deref());
    let cursor = query
        .cursor
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let page = FeedPaginator::new(&state.db)
        .page(&campus_id, limit, cursor)
        .await?;
    let items = enrich_submissions(&state.db, page.items).await?;

    Ok(Json(FeedResponse {
        items,
        next_cursor: page.next_cursor,
    }))
}
