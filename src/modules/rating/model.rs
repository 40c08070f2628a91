use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A rating a viewer gave, with the slug of the rated movie for display.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieRating {
    pub movie_id: Uuid,
    pub slug: String,
    pub rating: i32,
}

/// Cross-viewer average plus, when a viewer was given, that viewer's own rating.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateRating {
    pub rating: Option<f32>,
    pub user_rating: Option<i32>,
}
