use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaUploadResponse {
    pub id: String,
    #[schema(example = "/api/v1/media/0193a1b2-0000-7000-8000-00000000000a")]
    pub url: String,
    #[schema(example = "avatar.png")]
    pub filename: String,
}
