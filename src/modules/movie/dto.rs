use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};
use super::model::{Movie, MovieQuery, SortBy};
use crate::common::error::{AppError, AppResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub title: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
}

impl CreateMovieRequest {
    pub fn into_movie(self) -> Movie {
        Movie::new(Uuid::new_v4(), self.title.trim().to_string(), self.year_of_release, normalize_genres(self.genres))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
    pub title: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
}

impl UpdateMovieRequest {
    pub fn into_movie(self, id: Uuid) -> Movie {
        Movie::new(id, self.title.trim().to_string(), self.year_of_release, normalize_genres(self.genres))
    }
}

/// Trims names, drops blanks and repeats while keeping first-seen order.
fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim();
        if !genre.is_empty() && !normalized.iter().any(|g| g == genre) {
            normalized.push(genre.to_string());
        }
    }
    normalized
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub user_rating: Option<i32>,
}

impl From<Movie> for MovieResponse {
    fn from(m: Movie) -> Self {
        Self {
            slug: m.slug(),
            id: m.id,
            title: m.title,
            year_of_release: m.year_of_release,
            genres: m.genres,
            rating: m.rating,
            user_rating: m.user_rating,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListMoviesQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Exact year of release
    pub year: Option<i32>,
    /// `title` or `yearofrelease`, prefixed with `-` for descending order
    pub sort_by: Option<String>,
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 25, message = "Page size must be between 1 and 25"))]
    pub page_size: Option<u32>,
}

impl ListMoviesQuery {
    /// Checks paging bounds and resolves `sort_by` through the column allow-list.
    pub fn into_query(self, viewer_id: Option<Uuid>) -> AppResult<MovieQuery> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);

        let sort = match self.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match raw.parse::<SortBy>() {
                Ok(sort) => Some(sort),
                Err(message) => {
                    let mut error = ValidationError::new("sort_field");
                    error.message = Some(message.into());
                    errors.add("sort_by", error);
                    None
                }
            },
            None => None,
        };

        if !errors.errors().is_empty() {
            return Err(AppError::from(errors));
        }

        Ok(MovieQuery {
            title: self.title.filter(|t| !t.trim().is_empty()),
            year_of_release: self.year,
            sort,
            page: self.page.unwrap_or(DEFAULT_PAGE),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            viewer_id,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub has_next_page: bool,
}

impl<T> PagedResponse<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total: i64) -> Self {
        Self {
            items,
            page,
            page_size,
            total,
            has_next_page: i64::from(page) * i64::from(page_size) < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::movie::model::{SortField, SortOrder};

    #[test]
    fn defaults_apply_when_paging_is_omitted() {
        let query = ListMoviesQuery::default().into_query(None).unwrap();
        assert_eq!(query.page, DEFAULT_PAGE);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.sort, None);
    }

    #[test]
    fn sort_by_is_resolved_through_the_allow_list() {
        let params = ListMoviesQuery {
            sort_by: Some("-title".into()),
            ..Default::default()
        };
        let query = params.into_query(None).unwrap();
        assert_eq!(
            query.sort,
            Some(SortBy { field: SortField::Title, order: SortOrder::Descending })
        );
    }

    #[test]
    fn invalid_options_are_reported_together() {
        let params = ListMoviesQuery {
            sort_by: Some("rating; --".into()),
            page: Some(0),
            page_size: Some(100),
            ..Default::default()
        };

        let Err(AppError::ValidationFailed(failures)) = params.into_query(None) else {
            panic!("expected validation failure");
        };
        let properties: Vec<&str> = failures.iter().map(|f| f.property_name.as_str()).collect();
        assert_eq!(properties, vec!["page", "pageSize", "sortBy"]);
    }

    #[test]
    fn genres_are_trimmed_and_deduplicated() {
        let request = CreateMovieRequest {
            title: "  Dune ".into(),
            year_of_release: 2021,
            genres: vec!["Sci-Fi".into(), " Sci-Fi".into(), "".into(), "Drama".into()],
        };
        let movie = request.into_movie();
        assert_eq!(movie.title, "Dune");
        assert_eq!(movie.genres, vec!["Sci-Fi".to_string(), "Drama".to_string()]);
    }

    #[test]
    fn paged_response_knows_when_more_pages_exist() {
        assert!(PagedResponse::new(vec![1, 2], 2, 2, 5).has_next_page);
        assert!(!PagedResponse::new(vec![5], 3, 2, 5).has_next_page);
    }
}
