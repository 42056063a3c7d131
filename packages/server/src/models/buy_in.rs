use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::buy_in;

#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuyInRequest {
    /// Defaults to the caller's campus.
    pub campus_id: Option<String>,
    /// `YYYY-MM-DD`. Defaults to tomorrow (UTC).
    #[schema(example = "2025-05-11")]
    pub date: Option<String>,
    /// Defaults to 1. Must be positive.
    #[schema(example = 1)]
    pub amount: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct BuyInStatusQuery {
    /// `YYYY-MM-DD`. Defaults to today (UTC).
    pub date: Option<String>,
    /// Defaults to the caller's campus.
    pub campus_id: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyInResponse {
    pub user_id: String,
    pub campus_id: String,
    /// UTC midnight of the day bought into.
    pub date: DateTime<Utc>,
    pub amount: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<buy_in::Model> for BuyInResponse {
    fn from(m: buy_in::Model) -> Self {
        Self {
            user_id: m.user_id,
            campus_id: m.campus_id,
            date: m.date,
            amount: m.amount,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyInStatusResponse {
    pub has_buy_in: bool,
    pub buy_in: Option<BuyInResponse>,
}
