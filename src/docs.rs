use utoipa::OpenApi;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use crate::modules::movie::dto::{CreateMovieRequest, MovieResponse, UpdateMovieRequest};
use crate::modules::rating::dto::{RateMovieRequest, UserRatingsResponse};
use crate::modules::rating::model::MovieRating;
use crate::common::error::ValidationFailure;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::movie::handler::list_movies,
        crate::modules::movie::handler::get_movie,
        crate::modules::movie::handler::create_movie,
        crate::modules::movie::handler::update_movie,
        crate::modules::movie::handler::delete_movie,
        crate::modules::rating::handler::rate_movie,
        crate::modules::rating::handler::delete_rating,
        crate::modules::rating::handler::list_my_ratings,
    ),
    components(
        schemas(
            CreateMovieRequest, UpdateMovieRequest, MovieResponse,
            RateMovieRequest, UserRatingsResponse, MovieRating,
            ValidationFailure,
        )
    ),
    tags(
        (name = "Movies", description = "Movie catalog"),
        (name = "Ratings", description = "Viewer ratings")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
