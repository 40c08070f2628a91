use crate::common::error::{AppError, AppResult};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use std::future::Future;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Races `operation` against `token`. On cancellation the operation future is
/// dropped, which aborts any in-flight statement and rolls back an open transaction.
pub async fn cancellable<T, F>(token: &CancellationToken, operation: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AppError::Cancelled),
        result = operation => result,
    }
}

/// Per-request cancellation signal. The token fires when the request future is
/// dropped, e.g. because the client went away.
pub struct RequestCancellation {
    token: CancellationToken,
    _guard: DropGuard,
}

impl RequestCancellation {
    pub fn new() -> Self {
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();
        Self { token, _guard: guard }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl<S> FromRequestParts<S> for RequestCancellation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new())
    }
}
