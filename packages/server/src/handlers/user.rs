use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{buy_in, submission, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::campus::find_campus;
use crate::models::shared::non_blank;
use crate::models::user::{
    CompleteOnboardingRequest, CreateUserRequest, UpdateProfileImageRequest, UserResponse,
    validate_user_fields,
};
use crate::state::AppState;
use crate::utils::phone::normalize_e164;

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Sign up",
    description = "Creates a user profile. Credentials are managed by the identity service.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (INVALID_REQUEST)", body = ErrorBody),
        (status = 404, description = "Campus not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_user_fields(&payload.name, &payload.username, &payload.campus_id)?;
    let campus = find_campus(&state.db, payload.campus_id.trim()).await?;

    let phone_number = match non_blank(payload.phone_number.as_deref()) {
        Some(raw) => Some(parse_phone(raw)?),
        None => None,
    };
    if let Some(phone) = &phone_number
        && find_by_phone(&state.db, phone).await?.is_some()
    {
        return Err(AppError::InvalidRequest(
            "Phone number is already registered".into(),
        ));
    }

    let username = payload.username.trim().to_string();
    ensure_username_free(&state.db, &username, None).await?;

    let model = user::ActiveModel {
        id: Set(Uuid::now_v7().to_string()),
        name: Set(payload.name.trim().to_string()),
        username: Set(username),
        phone_number: Set(phone_number),
        profile_image: Set(None),
        campus_id: Set(campus.id),
        created_at: Set(state.clock.now()),
    };
    let user = model.insert(&state.db).await.map_err(map_unique_violation)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/complete",
    tag = "Users",
    operation_id = "completeOnboarding",
    summary = "Finish onboarding after phone verification",
    description = "Updates the profile owning `phoneNumber`, or creates one with the caller's ID. \
        A phone number owned by a different user is rejected.",
    request_body = CompleteOnboardingRequest,
    responses(
        (status = 200, description = "Profile saved", body = UserResponse),
        (status = 400, description = "Validation error (INVALID_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Phone belongs to someone else (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Campus not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn complete_onboarding(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CompleteOnboardingRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_user_fields(&payload.name, &payload.username, &payload.campus_id)?;
    let phone = parse_phone(&payload.phone_number)?;
    let campus = find_campus(&state.db, payload.campus_id.trim()).await?;
    let username = payload.username.trim().to_string();
    let name = payload.name.trim().to_string();

    let existing = match find_by_phone(&state.db, &phone).await? {
        Some(u) if u.id != auth_user.user_id => return Err(AppError::PermissionDenied),
        Some(u) => Some(u),
        None => user::Entity::find_by_id(auth_user.user_id.as_str())
            .one(&state.db)
            .await?,
    };

    let saved = match existing {
        Some(current) => {
            ensure_username_free(&state.db, &username, Some(&current.id)).await?;
            let mut active: user::ActiveModel = current.into();
            active.name = Set(name);
            active.username = Set(username);
            active.phone_number = Set(Some(phone));
            active.campus_id = Set(campus.id);
            active.update(&state.db).await.map_err(map_unique_violation)?
        }
        None => {
            ensure_username_free(&state.db, &username, None).await?;
            user::ActiveModel {
                id: Set(auth_user.user_id.clone()),
                name: Set(name),
                username: Set(username),
                phone_number: Set(Some(phone)),
                profile_image: Set(None),
                campus_id: Set(campus.id),
                created_at: Set(state.clock.now()),
            }
            .insert(&state.db)
            .await
            .map_err(map_unique_violation)?
        }
    };

    Ok(Json(UserResponse::from(saved)))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    operation_id = "getCurrentUser",
    summary = "Get the caller's profile",
    responses(
        (status = 200, description = "Caller profile", body = UserResponse),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No profile yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state.db, &auth_user.user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/me",
    tag = "Users",
    operation_id = "deleteAccount",
    summary = "Delete the caller's account",
    description = "Removes the profile together with its buy-ins and submissions. Uploaded media \
        stays addressable, since identical files may be shared with other users.",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn delete_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let user = find_user(&txn, &auth_user.user_id).await?;

    let submissions = submission::Entity::delete_many()
        .filter(submission::Column::UserId.eq(user.id.as_str()))
        .exec(&txn)
        .await?;
    let buy_ins = buy_in::Entity::delete_many()
        .filter(buy_in::Column::UserId.eq(user.id.as_str()))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(user.id.as_str()).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(
        submissions = submissions.rows_affected,
        buy_ins = buy_ins.rows_affected,
        "Account deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user profile",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state.db, &id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/me/profile-image",
    tag = "Users",
    operation_id = "updateProfileImage",
    summary = "Set the caller's profile image",
    description = "Takes a URL, typically one returned by `POST /media/upload`.",
    request_body = UpdateProfileImageRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error (INVALID_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No profile yet (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn update_profile_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileImageRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let image = non_blank(Some(&payload.profile_image))
        .ok_or_else(|| AppError::InvalidRequest("profileImage is required".into()))?
        .to_string();

    let user = find_user(&state.db, &auth_user.user_id).await?;
    let mut active: user::ActiveModel = user.into();
    active.profile_image = Set(Some(image));
    let updated = active.update(&state.db).await?;

    Ok(Json(UserResponse::from(updated)))
}

/// Load a user or fail with `NotFound`.
pub(crate) async fn find_user<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn find_by_phone<C: ConnectionTrait>(
    db: &C,
    phone: &str,
) -> Result<Option<user::Model>, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::PhoneNumber.eq(phone))
        .one(db)
        .await?)
}

async fn ensure_username_free<C: ConnectionTrait>(
    db: &C,
    username: &str,
    owner: Option<&str>,
) -> Result<(), AppError> {
    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    match taken {
        Some(other) if Some(other.id.as_str()) != owner => Err(AppError::UsernameTaken),
        _ => Ok(()),
    }
}

fn parse_phone(raw: &str) -> Result<String, AppError> {
    normalize_e164(raw).ok_or_else(|| AppError::InvalidRequest("Invalid phone number".into()))
}

fn map_unique_violation(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Profile race: unique constraint caught on write");
            AppError::UsernameTaken
        }
        _ => AppError::from(e),
    }
}
