use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::challenge;
use crate::error::AppError;

use super::shared::require_text;

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    pub campus_id: String,
    #[schema(example = "Hop across the quad")]
    pub title: String,
    pub description: String,
    pub hint: Option<String>,
    pub media_url: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub is_bonus: bool,
}

pub fn validate_create_challenge(req: &CreateChallengeRequest) -> Result<(), AppError> {
    require_text("Title", &req.title, 256)?;
    require_text("Description", &req.description, 4096)?;
    if req.scheduled_at >= req.expires_at {
        return Err(AppError::InvalidRequest(
            "scheduledAt must be before expiresAt".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CampusFilterQuery {
    /// Campus ID. Omit to list every campus.
    pub campus: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub id: String,
    pub campus_id: String,
    pub title: String,
    pub description: String,
    pub hint: Option<String>,
    pub media_url: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_bonus: bool,
    pub created_at: DateTime<Utc>,
}

impl From<challenge::Model> for ChallengeResponse {
    fn from(m: challenge::Model) -> Self {
        Self {
            id: m.id,
            campus_id: m.campus_id,
            title: m.title,
            description: m.description,
            hint: m.hint,
            media_url: m.media_url,
            scheduled_at: m.scheduled_at,
            expires_at: m.expires_at,
            is_bonus: m.is_bonus,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStatsResponse {
    /// Number of verified submissions for the challenge.
    #[schema(example = 12)]
    pub verified_count: u64,
}
