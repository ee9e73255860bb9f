use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    state::AppState,
};

pub mod recommendations;

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.allowed_origin.as_deref());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", post(recommendations::generate))
        .route(
            "/recommendations/suggest-trip/:user_id",
            post(recommendations::suggest_trip),
        )
}

/// Allows the configured frontend with credentials, or any origin without them
///
/// Credentialed CORS forbids `*` for methods and headers, so those mirror the
/// preflight request instead.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
