use super::model::{AggregateRating, MovieRating};
use crate::common::cancel::cancellable;
use crate::common::error::{AppError, AppResult};
use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Inserts or overwrites the viewer's rating. `false` when the movie does not exist.
    /// The value must already be range-checked.
    async fn rate(&self, movie_id: Uuid, rating: i32, user_id: Uuid, token: &CancellationToken) -> AppResult<bool>;

    async fn delete_rating(&self, movie_id: Uuid, user_id: Uuid, token: &CancellationToken) -> AppResult<bool>;

    /// Streams every rating the viewer has given. The stream is single-use and
    /// ends early once `token` is cancelled.
    fn ratings_for_user<'a>(
        &'a self,
        user_id: Uuid,
        token: &'a CancellationToken,
    ) -> BoxStream<'a, AppResult<MovieRating>>;

    async fn aggregate_rating(&self, movie_id: Uuid, token: &CancellationToken) -> AppResult<Option<f32>>;

    async fn aggregate_rating_for_user(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        token: &CancellationToken,
    ) -> AppResult<AggregateRating>;
}

pub struct PgRatingStore {
    pool: PgPool,
}

impl PgRatingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

#[async_trait]
impl RatingStore for PgRatingStore {
    async fn rate(&self, movie_id: Uuid, rating: i32, user_id: Uuid, token: &CancellationToken) -> AppResult<bool> {
        cancellable(token, async {
            let result = sqlx::query(
                r#"
                INSERT INTO ratings (userid, movieid, rating)
                VALUES ($1, $2, $3)
                ON CONFLICT (userid, movieid) DO UPDATE SET rating = EXCLUDED.rating
                "#,
            )
            .bind(user_id)
            .bind(movie_id)
            .bind(rating)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => Ok(true),
                Err(e) if is_foreign_key_violation(&e) => Ok(false),
                Err(e) => Err(AppError::from(e)),
            }
        })
        .await
    }

    async fn delete_rating(&self, movie_id: Uuid, user_id: Uuid, token: &CancellationToken) -> AppResult<bool> {
        cancellable(token, async {
            sqlx::query("DELETE FROM ratings WHERE movieid = $1 AND userid = $2")
                .bind(movie_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map(|result| result.rows_affected() > 0)
                .map_err(AppError::from)
        })
        .await
    }

    fn ratings_for_user<'a>(
        &'a self,
        user_id: Uuid,
        token: &'a CancellationToken,
    ) -> BoxStream<'a, AppResult<MovieRating>> {
        sqlx::query_as::<_, MovieRating>(
            r#"
            SELECT r.movieid AS movie_id, m.slug, r.rating
            FROM ratings r
            INNER JOIN movies m ON m.id = r.movieid
            WHERE r.userid = $1
            ORDER BY m.slug
            "#,
        )
        .bind(user_id)
        .fetch(&self.pool)
        .map_err(AppError::from)
        .take_until(token.cancelled())
        .boxed()
    }

    async fn aggregate_rating(&self, movie_id: Uuid, token: &CancellationToken) -> AppResult<Option<f32>> {
        cancellable(token, async {
            sqlx::query_scalar::<_, Option<f32>>(
                "SELECT round(avg(rating), 1)::float4 FROM ratings WHERE movieid = $1",
            )
            .bind(movie_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
        })
        .await
    }

    async fn aggregate_rating_for_user(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        token: &CancellationToken,
    ) -> AppResult<AggregateRating> {
        cancellable(token, async {
            sqlx::query_as::<_, (Option<f32>, Option<i32>)>(
                r#"
                SELECT round(avg(rating), 1)::float4,
                       (SELECT rating FROM ratings WHERE movieid = $1 AND userid = $2)
                FROM ratings
                WHERE movieid = $1
                "#,
            )
            .bind(movie_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map(|(rating, user_rating)| AggregateRating { rating, user_rating })
            .map_err(AppError::from)
        })
        .await
    }
}
