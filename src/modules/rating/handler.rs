use super::dto::{RateMovieRequest, UserRatingsResponse};
use crate::common::cancel::RequestCancellation;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::middleware::auth::AuthenticatedViewer;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// Rate a movie, replacing any earlier rating by the same viewer
#[utoipa::path(
    put,
    path = "/api/v1/movies/{id}/ratings",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    request_body = RateMovieRequest,
    responses(
        (status = 200, description = "Rating stored"),
        (status = 400, description = "Rating outside 1..=5"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Movie not found")
    ),
    tag = "Ratings",
    security(("bearer_auth" = []))
)]
pub async fn rate_movie(
    State(state): State<AppState>,
    AuthenticatedViewer(viewer): AuthenticatedViewer,
    cancel: RequestCancellation,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateMovieRequest>,
) -> impl IntoResponse {
    match state.ratings.rate_movie(id, payload.rating, viewer.userid, cancel.token()).await {
        Ok(()) => ApiSuccess(ApiResponse::success((), "Rating saved successfully"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove the viewer's rating for a movie
#[utoipa::path(
    delete,
    path = "/api/v1/movies/{id}/ratings",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Rating deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No rating to delete")
    ),
    tag = "Ratings",
    security(("bearer_auth" = []))
)]
pub async fn delete_rating(
    State(state): State<AppState>,
    AuthenticatedViewer(viewer): AuthenticatedViewer,
    cancel: RequestCancellation,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.ratings.delete_rating(id, viewer.userid, cancel.token()).await {
        Ok(()) => ApiSuccess(ApiResponse::success((), "Rating deleted successfully"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List every rating the viewer has given
#[utoipa::path(
    get,
    path = "/api/v1/ratings/me",
    responses(
        (status = 200, description = "The viewer's ratings", body = ApiResponse<UserRatingsResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Ratings",
    security(("bearer_auth" = []))
)]
pub async fn list_my_ratings(
    State(state): State<AppState>,
    AuthenticatedViewer(viewer): AuthenticatedViewer,
    cancel: RequestCancellation,
) -> impl IntoResponse {
    match state.ratings.list_user_ratings(viewer.userid, cancel.token()).await {
        Ok(ratings) => ApiSuccess(
            ApiResponse::success(UserRatingsResponse { ratings }, "Ratings retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}
