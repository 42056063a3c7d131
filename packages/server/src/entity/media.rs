use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference to an uploaded blob. Several rows may share one `content_hash`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media")]
pub struct Model {
    /// UUIDv7, also the last segment of the public URL.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub content_hash: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
    /// `video` for submissions, `image` for profile pictures and challenge art.
    pub kind: String,

    pub uploaded_by: String,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

pub const KIND_VIDEO: &str = "video";
pub const KIND_IMAGE: &str = "image";

/// Public URL under which a media row is served.
pub fn url_for(id: &str) -> String {
    format!("/api/v1/media/{id}")
}
