pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Whole-request ceiling: ten 5 MiB files plus multipart framing and the
/// job description. Per-file limits are enforced in the analyze handler.
const MAX_BODY_BYTES: usize = 60 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/analyze", post(handlers::handle_analyze))
        .route("/api/session/:session_id", get(handlers::handle_get_session))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
