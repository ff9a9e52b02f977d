use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.upload.max_upload_size as usize;

    let mut router = Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/subscribe", get(handlers::subscribe))
        // Form intake
        .route(
            "/submit_subscription",
            post(handlers::submit_subscription).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Stored screenshots are payment data; only exposed when opted in
    if state.config.upload.serve_public {
        router = router.route("/static/uploads/:name", get(handlers::serve_upload));
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
