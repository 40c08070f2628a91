use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// A catalog entry. Genres are a set: order is not significant and duplicates are dropped on write.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Movie {
    pub id: Uuid,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub year_of_release: i32,
    #[validate(length(min = 1, message = "At least one genre is required"))]
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub user_rating: Option<i32>,
}

impl Movie {
    pub fn new(id: Uuid, title: String, year_of_release: i32, genres: Vec<String>) -> Self {
        Self {
            id,
            title,
            year_of_release,
            genres,
            rating: None,
            user_rating: None,
        }
    }

    pub fn slug(&self) -> String {
        generate_slug(&self.title, self.year_of_release)
    }
}

/// `"The Matrix!", 1999` -> `"the-matrix-1999"`.
pub fn generate_slug(title: &str, year_of_release: i32) -> String {
    let title: String = title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    format!("{}-{}", title, year_of_release)
}

/// Row shape shared by every read query: genres arrive pre-aggregated, ratings pre-averaged.
#[derive(Debug, FromRow)]
pub struct MovieRow {
    pub id: Uuid,
    pub title: String,
    pub yearofrelease: i32,
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub userrating: Option<i32>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            year_of_release: row.yearofrelease,
            genres: row.genres,
            rating: row.rating,
            user_rating: row.userrating,
        }
    }
}

/// Columns a listing may be ordered by. Nothing outside this enum ever reaches query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    YearOfRelease,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::YearOfRelease => "yearofrelease",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "yearofrelease" => Ok(SortField::YearOfRelease),
            other => Err(format!("Cannot sort by '{}'; allowed fields are title, yearofrelease", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBy {
    pub field: SortField,
    pub order: SortOrder,
}

impl FromStr for SortBy {
    type Err = String;

    /// `title`, `+title` sort ascending; `-title` sorts descending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (order, field) = match s.strip_prefix('-') {
            Some(rest) => (SortOrder::Descending, rest),
            None => (SortOrder::Ascending, s.strip_prefix('+').unwrap_or(s)),
        };
        Ok(Self {
            field: field.parse()?,
            order,
        })
    }
}

/// Filter, sort and page parameters for one listing. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieQuery {
    pub title: Option<String>,
    pub year_of_release: Option<i32>,
    pub sort: Option<SortBy>,
    pub page: u32,
    pub page_size: u32,
    /// Only used to join in the viewer's own rating; never filters rows.
    pub viewer_id: Option<Uuid>,
}

impl MovieQuery {
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_punctuation_and_hyphenates_spaces() {
        assert_eq!(generate_slug("The Matrix!", 1999), "the-matrix-1999");
        assert_eq!(generate_slug("Nick's: Tale", 2010), "nicks-tale-2010");
    }

    #[test]
    fn slug_is_deterministic() {
        let movie = Movie::new(Uuid::new_v4(), "Spirited Away".into(), 2001, vec!["Animation".into()]);
        assert_eq!(movie.slug(), movie.slug());
        assert_eq!(movie.slug(), "spirited-away-2001");
    }

    #[test]
    fn sort_by_parses_direction_prefix() {
        let asc: SortBy = "+title".parse().unwrap();
        assert_eq!(asc.field, SortField::Title);
        assert_eq!(asc.order, SortOrder::Ascending);

        let desc: SortBy = "-yearofrelease".parse().unwrap();
        assert_eq!(desc.field, SortField::YearOfRelease);
        assert_eq!(desc.order, SortOrder::Descending);

        let plain: SortBy = "Title".parse().unwrap();
        assert_eq!(plain.order, SortOrder::Ascending);
    }

    #[test]
    fn sort_by_rejects_unknown_columns() {
        assert!("id; DROP TABLE movies".parse::<SortBy>().is_err());
        assert!("-slug".parse::<SortBy>().is_err());
    }

    #[test]
    fn offset_is_zero_based() {
        let query = MovieQuery {
            title: None,
            year_of_release: None,
            sort: None,
            page: 2,
            page_size: 2,
            viewer_id: None,
        };
        assert_eq!(query.offset(), 2);
    }
}
