use super::model::{MAX_RATING, MIN_RATING, MovieRating};
use super::repository::RatingStore;
use crate::common::error::{AppError, AppResult};
use futures_util::TryStreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

pub struct RatingService {
    ratings: Arc<dyn RatingStore>,
}

impl RatingService {
    pub fn new(ratings: Arc<dyn RatingStore>) -> Self {
        Self { ratings }
    }

    /// Inserts or overwrites the viewer's rating for a movie.
    pub async fn rate_movie(&self, movie_id: Uuid, rating: i32, user_id: Uuid, token: &CancellationToken) -> AppResult<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            warn!(%movie_id, rating, "rejected rating outside allowed range");
            return Err(AppError::validation(
                "rating",
                &format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING),
            ));
        }

        if !self.ratings.rate(movie_id, rating, user_id, token).await? {
            return Err(AppError::NotFound);
        }

        info!(%movie_id, %user_id, rating, "rating upserted");
        Ok(())
    }

    pub async fn delete_rating(&self, movie_id: Uuid, user_id: Uuid, token: &CancellationToken) -> AppResult<()> {
        if !self.ratings.delete_rating(movie_id, user_id, token).await? {
            return Err(AppError::NotFound);
        }

        info!(%movie_id, %user_id, "rating deleted");
        Ok(())
    }

    pub async fn list_user_ratings(&self, user_id: Uuid, token: &CancellationToken) -> AppResult<Vec<MovieRating>> {
        let ratings: Vec<MovieRating> = self.ratings.ratings_for_user(user_id, token).try_collect().await?;

        // The stream ends early rather than erroring when cancelled.
        if token.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        Ok(ratings)
    }
}
