use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::campus;
use crate::error::AppError;

use super::shared::require_text;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCampusRequest {
    #[schema(example = "North Campus")]
    pub name: String,
}

pub fn validate_create_campus(req: &CreateCampusRequest) -> Result<(), AppError> {
    require_text("Campus name", &req.name, 128).map(|_| ())
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampusResponse {
    #[schema(example = "0193a1b2-0000-7000-8000-000000000001")]
    pub id: String,
    #[schema(example = "North Campus")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<campus::Model> for CampusResponse {
    fn from(m: campus::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}
