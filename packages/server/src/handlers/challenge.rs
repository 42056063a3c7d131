use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{challenge, submission};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::campus::find_campus;
use crate::models::challenge::*;
use crate::models::shared::non_blank;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Challenges",
    operation_id = "createChallenge",
    summary = "Schedule a challenge",
    description = "Admin only. `scheduledAt` must precede `expiresAt`.",
    request_body = CreateChallengeRequest,
    responses(
        (status = 201, description = "Challenge created", body = ChallengeResponse),
        (status = 400, description = "Validation error (INVALID_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Campus not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_challenge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateChallengeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_challenge(&payload)?;
    let campus = find_campus(&state.db, payload.campus_id.trim()).await?;

    let model = challenge::ActiveModel {
        id: Set(Uuid::now_v7().to_string()),
        campus_id: Set(campus.id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        hint: Set(payload.hint),
        media_url: Set(payload.media_url),
        scheduled_at: Set(payload.scheduled_at),
        expires_at: Set(payload.expires_at),
        is_bonus: Set(payload.is_bonus),
        created_at: Set(state.clock.now()),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ChallengeResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Challenges",
    operation_id = "listChallenges",
    summary = "List challenges",
    description = "Ordered by `scheduledAt`, then ID.",
    params(CampusFilterQuery),
    responses(
        (status = 200, description = "Challenges", body = Vec<ChallengeResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_challenges(
    State(state): State<AppState>,
    Query(query): Query<CampusFilterQuery>,
) -> Result<Json<Vec<ChallengeResponse>>, AppError> {
    let challenges = scoped(query.campus.as_deref())
        .all(&state.db)
        .await?;

    Ok(Json(challenges.into_iter().map(ChallengeResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/featured",
    tag = "Challenges",
    operation_id = "getFeaturedChallenge",
    summary = "Get the featured challenge",
    description = "Returns the earliest scheduled bonus challenge when several are flagged.",
    params(CampusFilterQuery),
    responses(
        (status = 200, description = "Featured challenge", body = ChallengeResponse),
        (status = 404, description = "No featured challenge (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn featured_challenge(
    State(state): State<AppState>,
    Query(query): Query<CampusFilterQuery>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let featured = scoped(query.campus.as_deref())
        .filter(challenge::Column::IsBonus.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No featured challenge".into()))?;

    Ok(Json(ChallengeResponse::from(featured)))
}

#[utoipa::path(
    get,
    path = "/today",
    tag = "Challenges",
    operation_id = "getTodaysChallenge",
    summary = "Get the challenge active right now",
    params(CampusFilterQuery),
    responses(
        (status = 200, description = "Active challenge", body = ChallengeResponse),
        (status = 404, description = "Nothing active (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn todays_challenge(
    State(state): State<AppState>,
    Query(query): Query<CampusFilterQuery>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let now = state.clock.now();
    let active = scoped(query.campus.as_deref())
        .filter(challenge::Column::ScheduledAt.lte(now))
        .filter(challenge::Column::ExpiresAt.gte(now))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No active challenge".into()))?;

    Ok(Json(ChallengeResponse::from(active)))
}

#[utoipa::path(
    get,
    path = "/{id}/stats",
    tag = "Challenges",
    operation_id = "getChallengeStats",
    summary = "Get challenge statistics",
    params(("id" = String, Path, description = "Challenge ID")),
    responses(
        (status = 200, description = "Statistics", body = ChallengeStatsResponse),
        (status = 404, description = "Challenge not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn challenge_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChallengeStatsResponse>, AppError> {
    challenge::Entity::find_by_id(id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge not found".into()))?;

    let verified_count = submission::Entity::find()
        .filter(submission::Column::ChallengeId.eq(id.as_str()))
        .filter(submission::Column::Verified.eq(true))
        .count(&state.db)
        .await?;

    Ok(Json(ChallengeStatsResponse { verified_count }))
}

fn scoped(campus: Option<&str>) -> Select<challenge::Entity> {
    let mut select = challenge::Entity::find()
        .order_by_asc(challenge::Column::ScheduledAt)
        .order_by_asc(challenge::Column::Id);
    if let Some(campus) = non_blank(campus) {
        select = select.filter(challenge::Column::CampusId.eq(campus));
    }
    select
}
