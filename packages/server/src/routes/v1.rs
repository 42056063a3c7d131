use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::{AppConfig, MediaConfig};
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/campus", campus_routes())
        .nest("/users", user_routes())
        .nest("/challenges", challenge_routes())
        .nest("/buyins", buy_in_routes())
        .nest("/submissions", submission_routes(&config.media))
        .nest("/leaderboard", leaderboard_routes())
        .nest("/media", media_routes(&config.media))
}

fn campus_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::campus::list_campuses,
        handlers::campus::create_campus
    ))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::create_user))
        .routes(routes!(handlers::user::complete_onboarding))
        .routes(routes!(handlers::user::me, handlers::user::delete_account))
        .routes(routes!(handlers::user::update_profile_image))
        .routes(routes!(handlers::user::get_user))
}

fn challenge_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::challenge::list_challenges,
            handlers::challenge::create_challenge
        ))
        .routes(routes!(handlers::challenge::featured_challenge))
        .routes(routes!(handlers::challenge::todays_challenge))
        .routes(routes!(handlers::challenge::challenge_stats))
}

fn buy_in_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::buy_in::create_buy_in))
        .routes(routes!(handlers::buy_in::buy_in_status))
}

fn submission_routes(media: &MediaConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::submission::create_submission))
        .layer(handlers::submission::submission_body_limit(media));

    OpenApiRouter::new()
        .routes(routes!(handlers::submission::campus_feed))
        .merge(upload)
}

fn leaderboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::leaderboard::leaderboard))
}

fn media_routes(media: &MediaConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::media::upload_image))
        .layer(handlers::media::upload_body_limit(media));

    OpenApiRouter::new()
        .routes(routes!(handlers::media::download_media))
        .merge(upload)
}
