//! In-memory stand-ins for the Postgres stores, used by service and handler tests.

use crate::common::error::{AppError, AppResult};
use crate::modules::movie::model::{Movie, MovieQuery, SortField, SortOrder};
use crate::modules::movie::repository::MovieStore;
use crate::modules::rating::model::{AggregateRating, MovieRating};
use crate::modules::rating::repository::RatingStore;
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Default)]
struct CatalogState {
    movies: Vec<Movie>,
    ratings: HashMap<(Uuid, Uuid), i32>,
}

/// Implements both store traits over one shared state and counts write calls.
#[derive(Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
    writes: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of create/update/delete calls that reached the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn rating_rows(&self, movie_id: Uuid) -> Vec<(Uuid, i32)> {
        let state = self.state.lock().unwrap();
        state
            .ratings
            .iter()
            .filter(|((_, m), _)| *m == movie_id)
            .map(|((u, _), r)| (*u, *r))
            .collect()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn dedup(genres: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        if !unique.contains(genre) {
            unique.push(genre.clone());
        }
    }
    unique
}

fn aggregate(state: &CatalogState, movie_id: Uuid, viewer_id: Option<Uuid>) -> AggregateRating {
    let values: Vec<i32> = state
        .ratings
        .iter()
        .filter(|((_, m), _)| *m == movie_id)
        .map(|(_, r)| *r)
        .collect();
    let rating = if values.is_empty() {
        None
    } else {
        let avg = values.iter().sum::<i32>() as f32 / values.len() as f32;
        Some((avg * 10.0).round() / 10.0)
    };
    let user_rating = viewer_id.and_then(|user| state.ratings.get(&(user, movie_id)).copied());
    AggregateRating { rating, user_rating }
}

fn enriched(state: &CatalogState, movie: &Movie, viewer_id: Option<Uuid>) -> Movie {
    let ratings = aggregate(state, movie.id, viewer_id);
    let mut movie = movie.clone();
    movie.rating = ratings.rating;
    movie.user_rating = ratings.user_rating;
    movie
}

fn matches_filters(movie: &Movie, title: Option<&str>, year: Option<i32>) -> bool {
    title.is_none_or(|t| movie.title.to_lowercase().contains(&t.to_lowercase()))
        && year.is_none_or(|y| movie.year_of_release == y)
}

#[async_trait]
impl MovieStore for InMemoryCatalog {
    async fn create(&self, movie: &Movie, _token: &CancellationToken) -> AppResult<()> {
        self.record_write();
        let mut state = self.state.lock().unwrap();
        if state.movies.iter().any(|m| m.id == movie.id || m.slug() == movie.slug()) {
            return Err(AppError::Conflict("duplicate movie".into()));
        }
        let stored = Movie::new(movie.id, movie.title.clone(), movie.year_of_release, dedup(&movie.genres));
        state.movies.push(stored);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid, viewer_id: Option<Uuid>, _token: &CancellationToken) -> AppResult<Option<Movie>> {
        let state = self.state.lock().unwrap();
        Ok(state.movies.iter().find(|m| m.id == id).map(|m| enriched(&state, m, viewer_id)))
    }

    async fn get_by_slug(&self, slug: &str, viewer_id: Option<Uuid>, _token: &CancellationToken) -> AppResult<Option<Movie>> {
        let state = self.state.lock().unwrap();
        Ok(state.movies.iter().find(|m| m.slug() == slug).map(|m| enriched(&state, m, viewer_id)))
    }

    async fn get_all(&self, query: &MovieQuery, _token: &CancellationToken) -> AppResult<Vec<Movie>> {
        let state = self.state.lock().unwrap();
        let mut movies: Vec<&Movie> = state
            .movies
            .iter()
            .filter(|m| matches_filters(m, query.title.as_deref(), query.year_of_release))
            .collect();

        movies.sort_by(|a, b| {
            let primary = match query.sort {
                Some(sort) => {
                    let ordering = match sort.field {
                        SortField::Title => a.title.cmp(&b.title),
                        SortField::YearOfRelease => a.year_of_release.cmp(&b.year_of_release),
                    };
                    match sort.order {
                        SortOrder::Ascending => ordering,
                        SortOrder::Descending => ordering.reverse(),
                    }
                }
                None => std::cmp::Ordering::Equal,
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        Ok(movies
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .map(|m| enriched(&state, m, query.viewer_id))
            .collect())
    }

    async fn count(&self, title: Option<&str>, year_of_release: Option<i32>, _token: &CancellationToken) -> AppResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state.movies.iter().filter(|m| matches_filters(m, title, year_of_release)).count() as i64)
    }

    async fn update(&self, movie: &Movie, _token: &CancellationToken) -> AppResult<bool> {
        self.record_write();
        let mut state = self.state.lock().unwrap();
        if state.movies.iter().any(|m| m.id != movie.id && m.slug() == movie.slug()) {
            return Err(AppError::Conflict("duplicate movie".into()));
        }
        match state.movies.iter_mut().find(|m| m.id == movie.id) {
            Some(stored) => {
                stored.title = movie.title.clone();
                stored.year_of_release = movie.year_of_release;
                stored.genres = dedup(&movie.genres);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists_by_id(&self, id: Uuid, _token: &CancellationToken) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().movies.iter().any(|m| m.id == id))
    }

    async fn delete_by_id(&self, id: Uuid, _token: &CancellationToken) -> AppResult<bool> {
        self.record_write();
        let mut state = self.state.lock().unwrap();
        let before = state.movies.len();
        state.movies.retain(|m| m.id != id);
        state.ratings.retain(|(_, movie_id), _| *movie_id != id);
        Ok(state.movies.len() < before)
    }
}

#[async_trait]
impl RatingStore for InMemoryCatalog {
    async fn rate(&self, movie_id: Uuid, rating: i32, user_id: Uuid, _token: &CancellationToken) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        if !state.movies.iter().any(|m| m.id == movie_id) {
            return Ok(false);
        }
        state.ratings.insert((user_id, movie_id), rating);
        Ok(true)
    }

    async fn delete_rating(&self, movie_id: Uuid, user_id: Uuid, _token: &CancellationToken) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().ratings.remove(&(user_id, movie_id)).is_some())
    }

    fn ratings_for_user<'a>(&'a self, user_id: Uuid, _token: &'a CancellationToken) -> BoxStream<'a, AppResult<MovieRating>> {
        let state = self.state.lock().unwrap();
        let mut ratings: Vec<AppResult<MovieRating>> = state
            .ratings
            .iter()
            .filter(|((u, _), _)| *u == user_id)
            .filter_map(|((_, movie_id), rating)| {
                state.movies.iter().find(|m| m.id == *movie_id).map(|m| {
                    Ok(MovieRating {
                        movie_id: m.id,
                        slug: m.slug(),
                        rating: *rating,
                    })
                })
            })
            .collect();
        ratings.sort_by(|a, b| match (a, b) {
            (Ok(a), Ok(b)) => a.slug.cmp(&b.slug),
            _ => std::cmp::Ordering::Equal,
        });
        stream::iter(ratings).boxed()
    }

    async fn aggregate_rating(&self, movie_id: Uuid, _token: &CancellationToken) -> AppResult<Option<f32>> {
        Ok(aggregate(&self.state.lock().unwrap(), movie_id, None).rating)
    }

    async fn aggregate_rating_for_user(&self, movie_id: Uuid, user_id: Uuid, _token: &CancellationToken) -> AppResult<AggregateRating> {
        Ok(aggregate(&self.state.lock().unwrap(), movie_id, Some(user_id)))
    }
}
