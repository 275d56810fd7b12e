use super::handlers;
use super::state::AppState;
use crate::audio::MAX_UPLOAD_BYTES;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Single-step relays
        .route("/speech/transcribe", post(handlers::transcribe_speech))
        .route("/speech/feedback", post(handlers::generate_feedback))
        .route("/speech/paragraph", post(handlers::generate_paragraph))
        // Full upload pipeline
        .route("/speech/process", post(handlers::process_speech))
        // Recording sessions
        .route("/speech/record/start", post(handlers::start_recording))
        .route(
            "/speech/record/:session_id/chunk",
            post(handlers::push_chunk),
        )
        .route(
            "/speech/record/:session_id/stop",
            post(handlers::stop_recording),
        )
        .route(
            "/speech/record/:session_id/status",
            get(handlers::record_status),
        )
        // Allow uploads up to the payload cap plus multipart framing overhead
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        // Browser UI calls these endpoints cross-origin in development
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
