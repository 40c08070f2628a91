use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;
pub mod validator;

pub fn router() -> Router<AppState> {
    let public_routes = Router::new()
        .route("/movies", get(handler::list_movies))
        .route("/movies/{id}", get(handler::get_movie));

    let member_routes = Router::new()
        .route("/movies", post(handler::create_movie))
        .route("/movies/{id}", put(handler::update_movie))
        .route_layer(middleware::from_fn(crate::middleware::role::trusted_member_guard));

    let admin_routes = Router::new()
        .route("/movies/{id}", delete(handler::delete_movie))
        .route_layer(middleware::from_fn(crate::middleware::role::admin_guard));

    public_routes.merge(member_routes).merge(admin_routes)
}
