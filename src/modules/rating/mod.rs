use axum::Router;
use axum::routing::{get, put};
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

/// Every rating route requires an authenticated viewer, enforced by the `AuthenticatedViewer` extractor.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies/{id}/ratings", put(handler::rate_movie).delete(handler::delete_rating))
        .route("/ratings/me", get(handler::list_my_ratings))
}
