use serde::{Deserialize, Serialize};

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Campus ID. Absent, or a campus without users, ranks everyone.
    pub campus: Option<String>,
    /// `daily`, `weekly` (default), `monthly` or `overall`.
    #[serde(alias = "type")]
    pub period: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RankedUser {
    pub id: String,
    /// Username cut to 10 characters, else the full name, else `User`.
    #[schema(example = "muchtoolon…")]
    pub name: String,
    #[schema(example = 3)]
    pub score: i64,
    pub avatar: String,
    /// 1-based position.
    #[schema(example = 1)]
    pub rank: u64,
}
