use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{challenge, submission, user};

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAuthor {
    pub id: String,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Alice Wonder")]
    pub name: String,
    pub profile_image: Option<String>,
}

impl From<&user::Model> for SubmissionAuthor {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            name: u.name.clone(),
            profile_image: u.profile_image.clone(),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionChallenge {
    pub id: String,
    #[schema(example = "Hop across the quad")]
    pub title: String,
    pub description: String,
}

impl From<&challenge::Model> for SubmissionChallenge {
    fn from(c: &challenge::Model) -> Self {
        Self {
            id: c.id.clone(),
            title: c.title.clone(),
            description: c.description.clone(),
        }
    }
}

/// A submission with its author and challenge summaries.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: String,
    pub user_id: String,
    pub challenge_id: String,
    pub campus_id: String,
    #[schema(example = "/api/v1/media/0193a1b2-0000-7000-8000-00000000000a")]
    pub media_url: String,
    pub verified: bool,
    pub rank: Option<i32>,
    pub points_awarded: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    /// Absent only if the author row has been removed.
    pub user: Option<SubmissionAuthor>,
    pub challenge: Option<SubmissionChallenge>,
}

impl SubmissionView {
    pub fn new(
        s: submission::Model,
        user: Option<SubmissionAuthor>,
        challenge: Option<SubmissionChallenge>,
    ) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            challenge_id: s.challenge_id,
            campus_id: s.campus_id,
            media_url: s.media_url,
            verified: s.verified,
            rank: s.rank,
            points_awarded: s.points_awarded,
            created_at: s.created_at,
            verified_at: s.verified_at,
            user,
            challenge,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionResponse {
    #[schema(example = "Submission created")]
    pub message: String,
    pub submission: SubmissionView,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    /// Page size, 1-50. Defaults to 20; non-numeric values are ignored.
    pub limit: Option<String>,
    /// `nextCursor` from the previous page.
    pub cursor: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub items: Vec<SubmissionView>,
    /// Absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
