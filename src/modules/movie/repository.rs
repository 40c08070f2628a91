use super::model::{Movie, MovieQuery, MovieRow};
use crate::common::cancel::cancellable;
use crate::common::error::{AppError, AppResult};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Durable storage for movies and their genre rows.
///
/// Every call runs on its own pooled connection or transaction and releases it
/// before returning. Multi-statement writes are all-or-nothing.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn create(&self, movie: &Movie, token: &CancellationToken) -> AppResult<()>;

    async fn get_by_id(
        &self,
        id: Uuid,
        viewer_id: Option<Uuid>,
        token: &CancellationToken,
    ) -> AppResult<Option<Movie>>;

    async fn get_by_slug(
        &self,
        slug: &str,
        viewer_id: Option<Uuid>,
        token: &CancellationToken,
    ) -> AppResult<Option<Movie>>;

    async fn get_all(&self, query: &MovieQuery, token: &CancellationToken) -> AppResult<Vec<Movie>>;

    async fn count(
        &self,
        title: Option<&str>,
        year_of_release: Option<i32>,
        token: &CancellationToken,
    ) -> AppResult<i64>;

    /// Returns `false` when no movie has the given id.
    async fn update(&self, movie: &Movie, token: &CancellationToken) -> AppResult<bool>;

    async fn exists_by_id(&self, id: Uuid, token: &CancellationToken) -> AppResult<bool>;

    /// Removes the movie together with its genres and ratings.
    async fn delete_by_id(&self, id: Uuid, token: &CancellationToken) -> AppResult<bool>;
}

// Genres and both rating joins collapse into one row per movie. The genre join
// repeats each rating row uniformly, so the average is unaffected.
const MOVIE_SELECT: &str = "SELECT m.id, m.title, m.yearofrelease, \
    array_remove(array_agg(DISTINCT g.name), NULL) AS genres, \
    round(avg(r.rating), 1)::float4 AS rating, \
    myr.rating AS userrating \
    FROM movies m \
    LEFT JOIN genres g ON m.id = g.movieid \
    LEFT JOIN ratings r ON m.id = r.movieid \
    LEFT JOIN ratings myr ON m.id = myr.movieid AND myr.userid = ";

const MOVIE_GROUP_BY: &str = " GROUP BY m.id, myr.rating";

fn select_movies(viewer_id: Option<Uuid>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(MOVIE_SELECT);
    qb.push_bind(viewer_id);
    qb
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, title: Option<&str>, year_of_release: Option<i32>) {
    qb.push(" WHERE TRUE");
    if let Some(title) = title {
        qb.push(" AND m.title ILIKE ").push_bind(contains_pattern(title));
    }
    if let Some(year) = year_of_release {
        qb.push(" AND m.yearofrelease = ").push_bind(year);
    }
}

/// `%term%` with LIKE metacharacters in `term` matched literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn build_list_query(query: &MovieQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_movies(query.viewer_id);
    push_filters(&mut qb, query.title.as_deref(), query.year_of_release);
    qb.push(MOVIE_GROUP_BY);

    // Only allow-listed column names are interpolated; m.id keeps pages stable.
    match query.sort {
        Some(sort) => {
            qb.push(" ORDER BY m.")
                .push(sort.field.column())
                .push(" ")
                .push(sort.order.keyword())
                .push(", m.id");
        }
        None => {
            qb.push(" ORDER BY m.id");
        }
    }

    qb.push(" LIMIT ")
        .push_bind(i64::from(query.page_size))
        .push(" OFFSET ")
        .push_bind(query.offset());
    qb
}

pub(crate) fn build_count_query(title: Option<&str>, year_of_release: Option<i32>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT count(*) FROM movies m");
    push_filters(&mut qb, title, year_of_release);
    qb
}

async fn insert_genres(
    tx: &mut Transaction<'_, Postgres>,
    movie_id: Uuid,
    genres: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO genres (movieid, name)
        SELECT DISTINCT $1::uuid, unnest($2::text[])
        "#,
    )
    .bind(movie_id)
    .bind(genres)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_movie(&self, mut qb: QueryBuilder<'static, Postgres>) -> AppResult<Option<Movie>> {
        qb.push(MOVIE_GROUP_BY);
        let row = qb
            .build_query_as::<MovieRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn insert_movie(&self, movie: &Movie) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO movies (id, title, slug, yearofrelease)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(movie.slug())
        .bind(movie.year_of_release)
        .execute(&mut *tx)
        .await?;

        insert_genres(&mut tx, movie.id, &movie.genres).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_movie(&self, movie: &Movie) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = $1, slug = $2, yearofrelease = $3
            WHERE id = $4
            "#,
        )
        .bind(&movie.title)
        .bind(movie.slug())
        .bind(movie.year_of_release)
        .bind(movie.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM genres WHERE movieid = $1")
            .bind(movie.id)
            .execute(&mut *tx)
            .await?;
        insert_genres(&mut tx, movie.id, &movie.genres).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_movie(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ratings WHERE movieid = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM genres WHERE movieid = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn create(&self, movie: &Movie, token: &CancellationToken) -> AppResult<()> {
        cancellable(token, self.insert_movie(movie)).await
    }

    async fn get_by_id(
        &self,
        id: Uuid,
        viewer_id: Option<Uuid>,
        token: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        let mut qb = select_movies(viewer_id);
        qb.push(" WHERE m.id = ").push_bind(id);
        cancellable(token, self.fetch_one_movie(qb)).await
    }

    async fn get_by_slug(
        &self,
        slug: &str,
        viewer_id: Option<Uuid>,
        token: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        let mut qb = select_movies(viewer_id);
        qb.push(" WHERE m.slug = ").push_bind(slug.to_string());
        cancellable(token, self.fetch_one_movie(qb)).await
    }

    async fn get_all(&self, query: &MovieQuery, token: &CancellationToken) -> AppResult<Vec<Movie>> {
        let mut qb = build_list_query(query);
        cancellable(token, async {
            qb.build_query_as::<MovieRow>()
                .fetch_all(&self.pool)
                .await
                .map(|rows| rows.into_iter().map(Movie::from).collect())
                .map_err(AppError::from)
        })
        .await
    }

    async fn count(
        &self,
        title: Option<&str>,
        year_of_release: Option<i32>,
        token: &CancellationToken,
    ) -> AppResult<i64> {
        let mut qb = build_count_query(title, year_of_release);
        cancellable(token, async {
            qb.build_query_scalar::<i64>()
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn update(&self, movie: &Movie, token: &CancellationToken) -> AppResult<bool> {
        cancellable(token, self.update_movie(movie)).await
    }

    async fn exists_by_id(&self, id: Uuid, token: &CancellationToken) -> AppResult<bool> {
        cancellable(token, async {
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn delete_by_id(&self, id: Uuid, token: &CancellationToken) -> AppResult<bool> {
        cancellable(token, self.delete_movie(id)).await
    }
}
