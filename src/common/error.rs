use crate::common::response::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// One violated rule, reported against the property it concerns.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub property_name: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed with {} violation(s)", .0.len())]
    ValidationFailed(Vec<ValidationFailure>),

    #[error("Resource not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] sqlx::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(property_name: &str, message: &str) -> Self {
        AppError::ValidationFailed(vec![ValidationFailure {
            property_name: property_name.to_string(),
            message: message.to_string(),
        }])
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let message = match db_err.constraint() {
                    Some("movies_slug_key") => "This movie already exists in the system".to_string(),
                    Some(constraint) => format!("Unique constraint {} violated", constraint),
                    None => "Unique constraint violated".to_string(),
                };
                return AppError::Conflict(message);
            }
        }
        AppError::StorageUnavailable(err)
    }
}

/// `year_of_release` -> `yearOfRelease`, the name a client sent on the wire.
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = !name.is_empty();
        } else if upper_next {
            name.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// Flattens field errors under their wire names, sorted so reports are stable.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut failures: Vec<ValidationFailure> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |e| ValidationFailure {
                    property_name: wire_name(&field),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        failures.sort_by(|a, b| a.property_name.cmp(&b.property_name));
        AppError::ValidationFailed(failures)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::ValidationFailed(failures) => {
                (status, Json(ApiResponse::failure(failures, "Validation failed"))).into_response()
            }
            AppError::StorageUnavailable(ref e) => {
                error!(error = %e, "storage operation failed");
                (status, Json(ApiResponse::<()>::error("Storage unavailable"))).into_response()
            }
            other => (status, Json(ApiResponse::<()>::error(&other.to_string()))).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use validator::ValidationError;

    #[test]
    fn validation_errors_are_flattened_and_sorted() {
        let mut errors = ValidationErrors::new();
        let mut year = ValidationError::new("year_in_future");
        year.message = Some(Cow::from("Year cannot be in the future"));
        errors.add("year_of_release", year);
        errors.add("genres", ValidationError::new("length"));

        let AppError::ValidationFailed(failures) = AppError::from(errors) else {
            panic!("expected validation failure");
        };

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].property_name, "genres");
        assert_eq!(failures[0].message, "length");
        assert_eq!(failures[1].property_name, "yearOfRelease");
        assert_eq!(failures[1].message, "Year cannot be in the future");
    }

    #[test]
    fn property_names_use_camel_case() {
        assert_eq!(wire_name("page_size"), "pageSize");
        assert_eq!(wire_name("sort_by"), "sortBy");
        assert_eq!(wire_name("title"), "title");
    }

    #[test]
    fn row_not_found_is_a_storage_error() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::StorageUnavailable(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("taken".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::validation("title", "required").status_code(), StatusCode::BAD_REQUEST);
    }
}
