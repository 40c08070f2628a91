use super::model::MovieRating;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Range is checked by the rating service, 1 to 5 inclusive.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RateMovieRequest {
    pub rating: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRatingsResponse {
    pub ratings: Vec<MovieRating>,
}
