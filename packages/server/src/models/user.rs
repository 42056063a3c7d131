use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;

use super::shared::require_text;

/// Signup body. Credentials are held by the identity service, not here.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "Alice Wonder")]
    pub name: String,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "(555) 123-4567")]
    pub phone_number: Option<String>,
    pub campus_id: String,
}

/// Onboarding body: updates the user owning `phoneNumber`, or creates one.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOnboardingRequest {
    pub name: String,
    pub username: String,
    pub phone_number: String,
    pub campus_id: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileImageRequest {
    #[schema(example = "/api/v1/media/0193a1b2-0000-7000-8000-00000000000a")]
    pub profile_image: String,
}

pub fn validate_user_fields(name: &str, username: &str, campus_id: &str) -> Result<(), AppError> {
    require_text("Name", name, 64)?;
    let username = require_text("Username", username, 32)?;
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(AppError::InvalidRequest(
            "Username must contain only letters, digits, dots, and underscores".into(),
        ));
    }
    if campus_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("campusId is required".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    #[schema(example = "Alice Wonder")]
    pub name: String,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "+15551234567")]
    pub phone_number: Option<String>,
    pub campus_id: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            username: m.username,
            phone_number: m.phone_number,
            campus_id: m.campus_id,
            profile_image: m.profile_image,
            created_at: m.created_at,
        }
    }
}
