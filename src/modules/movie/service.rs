use super::dto::ListMoviesQuery;
use super::model::Movie;
use super::repository::MovieStore;
use super::validator::MovieValidator;
use crate::common::error::{AppError, AppResult};
use crate::modules::rating::repository::RatingStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// One page of a listing plus the total number of matching movies.
#[derive(Debug)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

pub struct MovieService {
    movies: Arc<dyn MovieStore>,
    ratings: Arc<dyn RatingStore>,
    validator: MovieValidator,
}

impl MovieService {
    pub fn new(movies: Arc<dyn MovieStore>, ratings: Arc<dyn RatingStore>, validator: MovieValidator) -> Self {
        Self {
            movies,
            ratings,
            validator,
        }
    }

    pub async fn create(&self, movie: Movie, token: &CancellationToken) -> AppResult<Movie> {
        self.validator.validate(&movie, token).await?;
        self.movies.create(&movie, token).await?;

        info!(movie_id = %movie.id, slug = %movie.slug(), "movie created");
        Ok(movie)
    }

    /// A value that parses as a UUID is looked up by id, anything else by slug.
    pub async fn get(&self, id_or_slug: &str, viewer_id: Option<Uuid>, token: &CancellationToken) -> AppResult<Movie> {
        let movie = match Uuid::parse_str(id_or_slug) {
            Ok(id) => self.movies.get_by_id(id, viewer_id, token).await?,
            Err(_) => self.movies.get_by_slug(id_or_slug, viewer_id, token).await?,
        };
        movie.ok_or(AppError::NotFound)
    }

    pub async fn list(
        &self,
        params: ListMoviesQuery,
        viewer_id: Option<Uuid>,
        token: &CancellationToken,
    ) -> AppResult<MoviePage> {
        let query = params.into_query(viewer_id)?;

        let movies = self.movies.get_all(&query, token).await?;
        let total = self
            .movies
            .count(query.title.as_deref(), query.year_of_release, token)
            .await?;

        Ok(MoviePage {
            movies,
            page: query.page,
            page_size: query.page_size,
            total,
        })
    }

    pub async fn update(&self, mut movie: Movie, viewer_id: Option<Uuid>, token: &CancellationToken) -> AppResult<Movie> {
        self.validator.validate(&movie, token).await?;

        if !self.movies.exists_by_id(movie.id, token).await? {
            return Err(AppError::NotFound);
        }

        // Deleted between the probe and the write.
        if !self.movies.update(&movie, token).await? {
            return Err(AppError::NotFound);
        }

        match viewer_id {
            Some(user_id) => {
                let ratings = self.ratings.aggregate_rating_for_user(movie.id, user_id, token).await?;
                movie.rating = ratings.rating;
                movie.user_rating = ratings.user_rating;
            }
            None => {
                movie.rating = self.ratings.aggregate_rating(movie.id, token).await?;
            }
        }

        info!(movie_id = %movie.id, slug = %movie.slug(), "movie updated");
        Ok(movie)
    }

    pub async fn delete(&self, id: Uuid, token: &CancellationToken) -> AppResult<()> {
        if !self.movies.delete_by_id(id, token).await? {
            return Err(AppError::NotFound);
        }

        info!(movie_id = %id, "movie deleted");
        Ok(())
    }
}
