use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,
    #[sea_orm(unique)]
    pub username: String,
    /// E.164 form, e.g. `+15551234567`.
    #[sea_orm(unique)]
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,

    pub campus_id: String,
    #[sea_orm(belongs_to, from = "campus_id", to = "id")]
    pub campus: HasOne<super::campus::Entity>,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
