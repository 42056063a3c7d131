use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One commitment per user, campus and UTC calendar day.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "buy_in")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub campus_id: String,
    /// Always UTC midnight.
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: DateTimeUtc,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "campus_id", to = "id")]
    pub campus: HasOne<super::campus::Entity>,

    pub amount: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
