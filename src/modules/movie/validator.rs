use super::model::Movie;
use super::repository::MovieStore;
use crate::common::error::{AppError, AppResult};
use async_trait::async_trait;
use std::borrow::Cow;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

pub const MOVIE_EXISTS: &str = "This movie already exists in the system";

/// Resolves a slug to the id currently holding it.
#[async_trait]
pub trait SlugLookup: Send + Sync {
    async fn find_id_by_slug(&self, slug: &str, token: &CancellationToken) -> AppResult<Option<Uuid>>;
}

#[async_trait]
impl<T> SlugLookup for T
where
    T: MovieStore + ?Sized,
{
    async fn find_id_by_slug(&self, slug: &str, token: &CancellationToken) -> AppResult<Option<Uuid>> {
        Ok(self.get_by_slug(slug, None, token).await?.map(|movie| movie.id))
    }
}

/// Gate for every create and update.
///
/// Structural rules (title, year, genres) are collected together with the slug
/// check. If the slug is the only problem the result is a `Conflict`; otherwise
/// every violation is reported in one `ValidationFailed`.
#[derive(Clone)]
pub struct MovieValidator {
    lookup: Arc<dyn SlugLookup>,
}

impl MovieValidator {
    pub fn new(lookup: Arc<dyn SlugLookup>) -> Self {
        Self { lookup }
    }

    pub async fn validate(&self, movie: &Movie, token: &CancellationToken) -> AppResult<()> {
        let mut errors = movie.validate().err().unwrap_or_else(ValidationErrors::new);

        let current_year = OffsetDateTime::now_utc().year();
        if movie.year_of_release > current_year {
            errors.add(
                "year_of_release",
                rule_violation(
                    "year_in_future",
                    format!("Year of release cannot be later than {}", current_year),
                ),
            );
        }

        let slug = movie.slug();
        let slug_taken = match self.lookup.find_id_by_slug(&slug, token).await? {
            Some(existing_id) => existing_id != movie.id,
            None => false,
        };

        if errors.errors().is_empty() {
            if slug_taken {
                warn!(%slug, movie_id = %movie.id, "rejected write: slug already taken");
                return Err(AppError::Conflict(MOVIE_EXISTS.to_string()));
            }
            return Ok(());
        }

        if slug_taken {
            errors.add("slug", rule_violation("slug_taken", MOVIE_EXISTS));
        }
        warn!(movie_id = %movie.id, "rejected write: movie failed validation");
        Err(errors.into())
    }
}

fn rule_violation(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}
