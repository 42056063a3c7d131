use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::campus::find_campus;
use crate::handlers::user::find_user;
use crate::models::buy_in::*;
use crate::models::shared::non_blank;
use crate::services::buy_in::{BuyInLedger, DEFAULT_BUY_IN_AMOUNT};
use crate::state::AppState;
use crate::utils::calendar::{next_utc_day, parse_calendar_date, start_of_utc_day};

#[utoipa::path(
    post,
    path = "/",
    tag = "Buy-ins",
    operation_id = "createBuyIn",
    summary = "Buy in for a day",
    description = "Idempotent per (user, campus, day): buying in again only updates the amount. \
        Defaults: campus is the caller's, date is tomorrow (UTC), amount is 1.",
    request_body = CreateBuyInRequest,
    responses(
        (status = 201, description = "Buy-in recorded", body = BuyInResponse),
        (status = 400, description = "Validation error (INVALID_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Campus not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_buy_in(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBuyInRequest>,
) -> Result<impl IntoResponse, AppError> {
    let campus_id = resolve_campus(&state, &auth_user, payload.campus_id.as_deref()).await?;
    let now = state.clock.now();

    let date = match non_blank(payload.date.as_deref()) {
        Some(raw) => parse_calendar_date(raw)?,
        None => next_utc_day(now),
    };
    let amount = payload.amount.unwrap_or(DEFAULT_BUY_IN_AMOUNT);
    if amount <= 0 {
        return Err(AppError::InvalidRequest("amount must be positive".into()));
    }

    let row = BuyInLedger::new(&state.db)
        .record_buy_in(&auth_user.user_id, &campus_id, date, amount, now)
        .await?;

    Ok((StatusCode::CREATED, Json(BuyInResponse::from(row))))
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "Buy-ins",
    operation_id = "getBuyInStatus",
    summary = "Check whether the caller bought in for a day",
    description = "Date defaults to today (UTC); campus defaults to the caller's.",
    params(BuyInStatusQuery),
    responses(
        (status = 200, description = "Buy-in status", body = BuyInStatusResponse),
        (status = 400, description = "Validation error (INVALID_REQUEST)", body = ErrorBody),
        (status = 401, description = "Unauthorized (UNAUTHENTICATED, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn buy_in_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<BuyInStatusQuery>,
) -> Result<Json<BuyInStatusResponse>, AppError> {
    let campus_id = resolve_campus(&state, &auth_user, query.campus_id.as_deref()).await?;
    let date = match non_blank(query.date.as_deref()) {
        Some(raw) => parse_calendar_date(raw)?,
        None => start_of_utc_day(state.clock.now()),
    };

    let found = BuyInLedger::new(&state.db)
        .find(&auth_user.user_id, &campus_id, date)
        .await?;

    Ok(Json(BuyInStatusResponse {
        has_buy_in: found.is_some(),
        buy_in: found.map(BuyInResponse::from),
    }))
}

/// The explicitly requested campus, else the caller's own.
async fn resolve_campus(
    state: &AppState,
    auth_user: &AuthUser,
    requested: Option<&str>,
) -> Result<String, AppError> {
    if let Some(campus_id) = non_blank(requested) {
        return Ok(find_campus(&state.db, campus_id).await?.id);
    }
    match find_user(&state.db, &auth_user.user_id).await {
        Ok(user) => Ok(user.campus_id),
        Err(AppError::NotFound(_)) => Err(AppError::InvalidRequest("campusId is required".into())),
        Err(e) => Err(e),
    }
}
