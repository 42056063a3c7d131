use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "challenge")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub campus_id: String,
    #[sea_orm(belongs_to, from = "campus_id", to = "id")]
    pub campus: HasOne<super::campus::Entity>,

    pub title: String,
    pub description: String,
    pub hint: Option<String>,
    pub media_url: Option<String>,
    pub scheduled_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
    /// Featured challenge flag. Several may be set at once.
    pub is_bonus: bool,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// Whether `at` falls within `[scheduled_at, expires_at]`.
    pub fn is_active_at(&self, at: DateTimeUtc) -> bool {
        self.scheduled_at <= at && at <= self.expires_at
    }
}

impl ActiveModelBehavior for ActiveModel {}
