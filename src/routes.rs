use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::docs::ApiDoc;
use crate::infrastructure::db::pool;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

pub fn configure_routes(state: AppState) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = crate::modules::movie::router()
        .merge(crate::modules::rating::router())
        .layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/_health", get(health_check))
        .nest("/api/v1", api)
        .layer(cors)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match pool::ping(&state.db).await {
        Ok(()) => ApiSuccess(ApiResponse::success("healthy", "Service is healthy"), StatusCode::OK).into_response(),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<()>::error("Database unreachable")),
            )
                .into_response()
        }
    }
}
