use crate::config::settings::AppConfig;
use crate::infrastructure::db::pool::DbPool;
use crate::modules::movie::repository::PgMovieStore;
use crate::modules::movie::service::MovieService;
use crate::modules::movie::validator::MovieValidator;
use crate::modules::rating::repository::PgRatingStore;
use crate::modules::rating::service::RatingService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub movies: Arc<MovieService>,
    pub ratings: Arc<RatingService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DbPool,
        movies: Arc<MovieService>,
        ratings: Arc<RatingService>,
    ) -> Self {
        Self {
            config,
            db,
            movies,
            ratings,
        }
    }

    /// Wires the Postgres-backed stores into the services.
    pub fn with_postgres(config: AppConfig, db: DbPool) -> Self {
        let movie_store = Arc::new(PgMovieStore::new(db.clone()));
        let rating_store = Arc::new(PgRatingStore::new(db.clone()));

        let movies = MovieService::new(
            movie_store.clone(),
            rating_store.clone(),
            MovieValidator::new(movie_store),
        );
        let ratings = RatingService::new(rating_store);

        Self::new(config, db, Arc::new(movies), Arc::new(ratings))
    }
}
