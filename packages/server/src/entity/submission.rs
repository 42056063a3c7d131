use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Proof video for a challenge.
///
/// `verified`, `rank`, `points_awarded` and `verified_at` are written by
/// moderation; admission only ever inserts unverified rows. At most one row
/// exists per `(user_id, challenge_id)`, enforced by
/// `uq_submission_user_challenge` (see `database::ensure_indexes`).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub challenge_id: String,
    #[sea_orm(belongs_to, from = "challenge_id", to = "id")]
    pub challenge: HasOne<super::challenge::Entity>,

    pub campus_id: String,

    pub media_url: String,
    pub verified: bool,
    /// 1 marks a win.
    pub rank: Option<i32>,
    pub points_awarded: Option<i32>,

    pub created_at: DateTimeUtc,
    pub verified_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
