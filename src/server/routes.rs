//! Router configuration for the web adapter.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.media_root);
    let body_limit = state.max_upload_bytes;
    let process = post(handlers::process_ocr).fallback(handlers::method_not_allowed);

    Router::new()
        .route("/", get(handlers::index))
        .route("/process", process.clone())
        .route("/process/", process)
        // Legacy single-PDF form
        .route("/home", get(handlers::home_form).post(handlers::home_upload))
        .route("/health", get(handlers::health))
        .nest_service("/media", media)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
