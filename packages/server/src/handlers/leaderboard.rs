use axum::Json;
use axum::extract::{Query, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::leaderboard::{LeaderboardQuery, RankedUser};
use crate::models::shared::non_blank;
use crate::services::leaderboard::{Leaderboard, Period};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Leaderboard",
    operation_id = "getLeaderboard",
    summary = "Rank users over a period",
    description = "Scores verified submissions using the configured rule (`wins` counts rank-1 \
        finishes, `points` sums awarded points). A submission counts when either its creation or \
        verification time falls in the window. Without a campus, or for a campus with no users, \
        every user is ranked. `type` is accepted as an alias of `period`.",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked users", body = Vec<RankedUser>),
        (status = 400, description = "Unknown period (INVALID_REQUEST)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<RankedUser>>, AppError> {
    let period = Period::parse(query.period.as_deref())?;
    let settings = &state.config.leaderboard;
    let limit = query.limit.unwrap_or(settings.default_limit);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);

    let ranked = Leaderboard::new(&state.db, settings.scoring, &settings.avatar_placeholder)
        .rank(
            non_blank(query.campus.as_deref()),
            period,
            limit,
            state.clock.now(),
        )
        .await?;

    Ok(Json(ranked))
}
