use super::dto::{CreateMovieRequest, ListMoviesQuery, MovieResponse, PagedResponse, UpdateMovieRequest};
use crate::common::cancel::RequestCancellation;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::middleware::auth::Viewer;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// List movies with optional filtering, sorting and paging
#[utoipa::path(
    get,
    path = "/api/v1/movies",
    params(ListMoviesQuery),
    responses(
        (status = 200, description = "Page of movies", body = ApiResponse<PagedResponse<MovieResponse>>),
        (status = 400, description = "Invalid query options")
    ),
    tag = "Movies"
)]
pub async fn list_movies(
    State(state): State<AppState>,
    viewer: Viewer,
    cancel: RequestCancellation,
    Query(params): Query<ListMoviesQuery>,
) -> impl IntoResponse {
    match state.movies.list(params, viewer.id(), cancel.token()).await {
        Ok(page) => {
            let items: Vec<MovieResponse> = page.movies.into_iter().map(MovieResponse::from).collect();
            ApiSuccess(
                ApiResponse::success(
                    PagedResponse::new(items, page.page, page.page_size, page.total),
                    "Movies retrieved successfully",
                ),
                StatusCode::OK,
            )
            .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a movie by id or slug
#[utoipa::path(
    get,
    path = "/api/v1/movies/{id}",
    params(
        ("id" = String, Path, description = "Movie ID or slug")
    ),
    responses(
        (status = 200, description = "Movie details", body = ApiResponse<MovieResponse>),
        (status = 404, description = "Movie not found")
    ),
    tag = "Movies"
)]
pub async fn get_movie(
    State(state): State<AppState>,
    viewer: Viewer,
    cancel: RequestCancellation,
    Path(id_or_slug): Path<String>,
) -> impl IntoResponse {
    match state.movies.get(&id_or_slug, viewer.id(), cancel.token()).await {
        Ok(movie) => ApiSuccess(
            ApiResponse::success(MovieResponse::from(movie), "Movie retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new movie
#[utoipa::path(
    post,
    path = "/api/v1/movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Movie already exists")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
pub async fn create_movie(
    State(state): State<AppState>,
    cancel: RequestCancellation,
    Json(payload): Json<CreateMovieRequest>,
) -> impl IntoResponse {
    match state.movies.create(payload.into_movie(), cancel.token()).await {
        Ok(movie) => ApiSuccess(
            ApiResponse::success(MovieResponse::from(movie), "Movie created successfully"),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Replace a movie's title, year and genres
#[utoipa::path(
    put,
    path = "/api/v1/movies/{id}",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    request_body = UpdateMovieRequest,
    responses(
        (status = 200, description = "Movie updated", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Movie not found"),
        (status = 409, description = "Slug taken by another movie")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
pub async fn update_movie(
    State(state): State<AppState>,
    viewer: Viewer,
    cancel: RequestCancellation,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovieRequest>,
) -> impl IntoResponse {
    match state.movies.update(payload.into_movie(id), viewer.id(), cancel.token()).await {
        Ok(movie) => ApiSuccess(
            ApiResponse::success(MovieResponse::from(movie), "Movie updated successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a movie together with its genres and ratings
#[utoipa::path(
    delete,
    path = "/api/v1/movies/{id}",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie deleted"),
        (status = 404, description = "Movie not found"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Movies",
    security(("bearer_auth" = []))
)]
pub async fn delete_movie(
    State(state): State<AppState>,
    cancel: RequestCancellation,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.movies.delete(id, cancel.token()).await {
        Ok(()) => ApiSuccess(ApiResponse::success((), "Movie deleted successfully"), StatusCode::OK).into_response(),
        Err(e) => e.into_response(),
    }
}
