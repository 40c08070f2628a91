use super::auth::Viewer;
use crate::common::error::AppError;
use axum::{extract::Request, middleware::Next, response::Response};

/// Create and update: trusted members and admins.
pub async fn trusted_member_guard(viewer: Viewer, req: Request, next: Next) -> Result<Response, AppError> {
    let allowed = viewer.0.as_ref().map(|claims| claims.trusted_member || claims.admin);
    authorize(allowed, "Trusted member access required")?;
    Ok(next.run(req).await)
}

/// Delete: admins only.
pub async fn admin_guard(viewer: Viewer, req: Request, next: Next) -> Result<Response, AppError> {
    let allowed = viewer.0.as_ref().map(|claims| claims.admin);
    authorize(allowed, "Admin access required")?;
    Ok(next.run(req).await)
}

/// `None` is an anonymous viewer (401); `Some(false)` lacks the claim (403).
fn authorize(allowed: Option<bool>, denial: &str) -> Result<(), AppError> {
    match allowed {
        None => Err(AppError::Unauthorized("Authentication required".to_string())),
        Some(false) => Err(AppError::Forbidden(denial.to_string())),
        Some(true) => Ok(()),
    }
}
