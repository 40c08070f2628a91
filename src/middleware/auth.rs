use crate::common::error::AppError;
use crate::config::settings::JwtSettings;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::debug;
use uuid::Uuid;

/// Claims carried by a viewer's bearer token. Tokens are minted by an external identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerClaims {
    pub userid: Uuid,
    pub exp: usize,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub trusted_member: bool,
}

pub fn decode_claims(token: &str, settings: &JwtSettings) -> Result<ViewerClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = &settings.issuer {
        validation.set_issuer(&[issuer]);
    }
    match &settings.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    decode::<ViewerClaims>(token, &DecodingKey::from_secret(settings.secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })
}

/// Resolves the optional bearer token into `ViewerClaims`.
///
/// No `Authorization` header means an anonymous viewer; a header that is not a
/// valid bearer token is rejected outright.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::Unauthorized("Malformed Authorization header".to_string()))?,
        None => return Ok(next.run(req).await),
    };

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Expected a Bearer token".to_string()))?;

    let claims = decode_claims(token.trim(), &state.config.jwt)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// The requesting viewer, if one authenticated.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<ViewerClaims>);

impl Viewer {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|claims| claims.userid)
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(parts.extensions.get::<ViewerClaims>().cloned()))
    }
}

/// A viewer that must be authenticated; anonymous requests are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedViewer(pub ViewerClaims);

impl<S> FromRequestParts<S> for AuthenticatedViewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ViewerClaims>()
            .cloned()
            .map(AuthenticatedViewer)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
