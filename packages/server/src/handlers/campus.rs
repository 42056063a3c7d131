use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::campus;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::campus::{CampusResponse, CreateCampusRequest, validate_create_campus};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Campus",
    operation_id = "createCampus",
    summary = "Create a campus",
    description = "Admin only.",
    request_body = CreateCampusRequest,
    responses(
        (status = 201, description = "Campus created", body = CampusResponse),
        (status = 400, description = "Validation error (INVALID_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_campus(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCampusRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_campus(&payload)?;

    let model = campus::ActiveModel {
        id: Set(Uuid::now_v7().to_string()),
        name: Set(payload.name.trim().to_string()),
        created_at: Set(state.clock.now()),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(CampusResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Campus",
    operation_id = "listCampuses",
    summary = "List campuses",
    description = "Public, so the signup screen can offer a campus picker.",
    responses((status = 200, description = "All campuses", body = Vec<CampusResponse>)),
)]
#[instrument(skip(state))]
pub async fn list_campuses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CampusResponse>>, AppError> {
    let campuses = campus::Entity::find()
        .order_by_asc(campus::Column::Name)
        .order_by_asc(campus::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(campuses.into_iter().map(CampusResponse::from).collect()))
}

/// Load a campus or fail with `NotFound`.
pub(crate) async fn find_campus<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<campus::Model, AppError> {
    campus::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Campus not found".into()))
}
